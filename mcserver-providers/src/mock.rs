//! In-memory provider for local runs and tests.
//!
//! Operations complete instantly: insert and start leave the instance RUNNING
//! with a documentation-range NAT IP, stop leaves it STOPPED. Every call is
//! counted so callers can assert which provider operations were issued.

use crate::{ComputeProvider, Operation};
use async_trait::async_trait;
use mcserver_common::{
    AccessConfig, ComputeInstance, InstanceSpec, NetworkInterface, ProviderError,
};
use std::sync::{Mutex, MutexGuard};

pub const MOCK_NAT_IP: &str = "203.0.113.10";
const MOCK_CREATION_TIMESTAMP: &str = "2024-01-01T00:00:00.000-00:00";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get: usize,
    pub insert: usize,
    pub start: usize,
    pub stop: usize,
}

impl CallCounts {
    pub fn mutations(&self) -> usize {
        self.insert + self.start + self.stop
    }

    pub fn total(&self) -> usize {
        self.get + self.mutations()
    }
}

#[derive(Default)]
struct MockState {
    instance: Option<ComputeInstance>,
    lookup_failure: Option<ProviderError>,
    mutation_failure: Option<ProviderError>,
    calls: CallCounts,
    inserted: Vec<InstanceSpec>,
    op_seq: u64,
}

impl MockState {
    fn next_op(&mut self, kind: &str) -> Operation {
        self.op_seq += 1;
        Operation {
            name: format!("operation-mock-{}-{}", kind, self.op_seq),
            status: "DONE".to_string(),
        }
    }
}

#[derive(Default)]
pub struct MockProvider {
    state: Mutex<MockState>,
}

impl MockProvider {
    /// A provider with no instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(instance: ComputeInstance) -> Self {
        let provider = Self::new();
        provider.set_instance(Some(instance));
        provider
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not wedge the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Build an instance record the way the Compute API reports it.
    pub fn instance_record(
        name: &str,
        zone: &str,
        status: &str,
        interfaces: Vec<Vec<Option<&str>>>,
    ) -> ComputeInstance {
        ComputeInstance {
            name: name.to_string(),
            status: status.to_string(),
            creation_timestamp: MOCK_CREATION_TIMESTAMP.to_string(),
            machine_type: format!(
                "https://www.googleapis.com/compute/v1/projects/mock/zones/{}/machineTypes/e2-medium",
                zone
            ),
            zone: format!("https://www.googleapis.com/compute/v1/projects/mock/zones/{}", zone),
            network_interfaces: interfaces
                .into_iter()
                .map(|configs| NetworkInterface {
                    network: Some("global/networks/default".to_string()),
                    access_configs: configs
                        .into_iter()
                        .map(|ip| AccessConfig {
                            name: Some("External NAT".to_string()),
                            nat_ip: ip.map(str::to_string),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn set_instance(&self, instance: Option<ComputeInstance>) {
        self.lock().instance = instance;
    }

    pub fn instance(&self) -> Option<ComputeInstance> {
        self.lock().instance.clone()
    }

    /// Make every lookup fail with `err` until cleared.
    pub fn fail_lookups_with(&self, err: ProviderError) {
        self.lock().lookup_failure = Some(err);
    }

    /// Make every insert/start/stop fail with `err` until cleared.
    pub fn fail_mutations_with(&self, err: ProviderError) {
        self.lock().mutation_failure = Some(err);
    }

    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.lookup_failure = None;
        state.mutation_failure = None;
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls.clone()
    }

    pub fn inserted_specs(&self) -> Vec<InstanceSpec> {
        self.lock().inserted.clone()
    }
}

fn not_found(zone: &str, name: &str) -> ProviderError {
    ProviderError::http(
        404,
        Some("notFound".to_string()),
        format!(
            "The resource 'projects/mock/zones/{}/instances/{}' was not found",
            zone, name
        ),
    )
}

fn set_running(instance: &mut ComputeInstance) {
    instance.status = "RUNNING".to_string();
    let has_ip = instance.first_nat_ip().is_some();
    if !has_ip {
        if let Some(ac) = instance
            .network_interfaces
            .iter_mut()
            .flat_map(|nic| nic.access_configs.iter_mut())
            .next()
        {
            ac.nat_ip = Some(MOCK_NAT_IP.to_string());
        }
    }
}

#[async_trait]
impl ComputeProvider for MockProvider {
    async fn get_instance(
        &self,
        _project: &str,
        zone: &str,
        name: &str,
    ) -> Result<ComputeInstance, ProviderError> {
        let mut state = self.lock();
        state.calls.get += 1;
        if let Some(err) = state.lookup_failure.clone() {
            return Err(err);
        }
        match state.instance.as_ref() {
            Some(instance) if instance.name == name => Ok(instance.clone()),
            _ => Err(not_found(zone, name)),
        }
    }

    async fn insert_instance(
        &self,
        _project: &str,
        zone: &str,
        spec: &InstanceSpec,
    ) -> Result<Operation, ProviderError> {
        let mut state = self.lock();
        state.calls.insert += 1;
        state.inserted.push(spec.clone());
        if let Some(err) = state.mutation_failure.clone() {
            return Err(err);
        }
        if state.instance.as_ref().map(|i| i.name == spec.name).unwrap_or(false) {
            return Err(ProviderError::http(
                409,
                Some("alreadyExists".to_string()),
                format!(
                    "The resource 'projects/mock/zones/{}/instances/{}' already exists",
                    zone, spec.name
                ),
            ));
        }
        let mut instance =
            Self::instance_record(&spec.name, zone, "PROVISIONING", vec![vec![None]]);
        instance.machine_type = format!(
            "https://www.googleapis.com/compute/v1/projects/mock/zones/{}/machineTypes/{}",
            zone, spec.machine_type
        );
        set_running(&mut instance);
        state.instance = Some(instance);
        tracing::info!("[Mock provider] created instance {} in {}", spec.name, zone);
        Ok(state.next_op("insert"))
    }

    async fn start_instance(
        &self,
        _project: &str,
        zone: &str,
        name: &str,
    ) -> Result<Operation, ProviderError> {
        let mut state = self.lock();
        state.calls.start += 1;
        if let Some(err) = state.mutation_failure.clone() {
            return Err(err);
        }
        match state.instance.as_mut() {
            Some(instance) if instance.name == name => set_running(instance),
            _ => return Err(not_found(zone, name)),
        }
        tracing::info!("[Mock provider] started instance {} in {}", name, zone);
        Ok(state.next_op("start"))
    }

    async fn stop_instance(
        &self,
        _project: &str,
        zone: &str,
        name: &str,
    ) -> Result<Operation, ProviderError> {
        let mut state = self.lock();
        state.calls.stop += 1;
        if let Some(err) = state.mutation_failure.clone() {
            return Err(err);
        }
        match state.instance.as_mut() {
            Some(instance) if instance.name == name => {
                instance.status = "STOPPED".to_string();
                for ac in instance
                    .network_interfaces
                    .iter_mut()
                    .flat_map(|nic| nic.access_configs.iter_mut())
                {
                    ac.nat_ip = None;
                }
            }
            _ => return Err(not_found(zone, name)),
        }
        tracing::info!("[Mock provider] stopped instance {} in {}", name, zone);
        Ok(state.next_op("stop"))
    }
}
