//! Instance lifecycle controller.
//!
//! Maps status/start/stop requests onto the provider operation that fits the
//! instance's state as reported by the provider right now. Nothing is cached
//! between calls: every operation starts with a fresh lookup.

use mcserver_common::{InstanceDescriptor, InstanceState, Lookup, ProviderError};
use mcserver_providers::ComputeProvider;

use crate::config::{InstanceTarget, InstanceTemplate};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// Instance was absent; creation (which also boots it) was requested.
    Creating,
    /// Instance existed but was not RUNNING; start was requested.
    Starting,
    AlreadyRunning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    Stopping,
    /// Instance exists but is not RUNNING; carries the state as reported.
    AlreadyStopped(InstanceState),
    NotFound,
}

pub struct LifecycleController<'a> {
    provider: &'a dyn ComputeProvider,
    target: &'a InstanceTarget,
}

impl<'a> LifecycleController<'a> {
    pub fn new(provider: &'a dyn ComputeProvider, target: &'a InstanceTarget) -> Self {
        Self { provider, target }
    }

    /// Provider get-instance with not-found classified as `Absent`.
    pub async fn lookup(&self) -> Result<Lookup, ProviderError> {
        let t = self.target;
        match self.provider.get_instance(&t.project, &t.zone, &t.name).await {
            Ok(instance) => Ok(Lookup::Found(InstanceDescriptor::from_resource(&instance))),
            Err(e) if e.is_not_found() => Ok(Lookup::Absent),
            Err(e) => Err(e),
        }
    }

    pub async fn status(&self) -> Result<Lookup, ProviderError> {
        let lookup = self.lookup().await?;
        tracing::debug!(
            "[lifecycle] status {}/{}: {}",
            self.target.zone,
            self.target.name,
            lookup.state()
        );
        Ok(lookup)
    }

    /// Idempotent upsert towards RUNNING. Creation is only reachable after the
    /// lookup proved the instance absent.
    pub async fn start(&self, template: &InstanceTemplate) -> Result<StartOutcome, ProviderError> {
        let t = self.target;
        let outcome = match self.lookup().await? {
            Lookup::Absent => {
                let spec = template.build(&t.name);
                self.provider.insert_instance(&t.project, &t.zone, &spec).await?;
                StartOutcome::Creating
            }
            Lookup::Found(d) if d.status.is_running() => StartOutcome::AlreadyRunning,
            Lookup::Found(d) => {
                tracing::debug!("[lifecycle] {} is {}, issuing start", t.name, d.status);
                self.provider.start_instance(&t.project, &t.zone, &t.name).await?;
                StartOutcome::Starting
            }
        };
        tracing::info!("[lifecycle] start {}/{}: {:?}", t.zone, t.name, outcome);
        Ok(outcome)
    }

    pub async fn stop(&self) -> Result<StopOutcome, ProviderError> {
        let t = self.target;
        let outcome = match self.lookup().await? {
            Lookup::Absent => StopOutcome::NotFound,
            Lookup::Found(d) if d.status.is_running() => {
                self.provider.stop_instance(&t.project, &t.zone, &t.name).await?;
                StopOutcome::Stopping
            }
            Lookup::Found(d) => StopOutcome::AlreadyStopped(d.status),
        };
        tracing::info!("[lifecycle] stop {}/{}: {:?}", t.zone, t.name, outcome);
        Ok(outcome)
    }
}
