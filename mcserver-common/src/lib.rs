use std::fmt;

pub mod error;
pub mod resource;

pub use error::{ControlError, CredentialError, ProviderError};
pub use resource::{AccessConfig, ComputeInstance, NetworkInterface};

/// Well-known name of the single instance this control plane manages.
pub const DEFAULT_INSTANCE_NAME: &str = "minecraft-server";

// -----------------------------------------------------------------------------
// Instance state (provider-reported)
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceState {
    /// Inferred locally from a classified not-found lookup; never reported by the provider.
    Absent,
    Provisioning,
    Running,
    Stopping,
    Stopped,
    Terminated,
    /// Any status outside the known set (STAGING, SUSPENDED, REPAIRING, ...).
    /// The raw provider string is kept so it can be echoed back verbatim.
    Unknown(String),
}

impl InstanceState {
    pub fn from_provider(raw: &str) -> Self {
        match raw {
            "PROVISIONING" => InstanceState::Provisioning,
            "RUNNING" => InstanceState::Running,
            "STOPPING" => InstanceState::Stopping,
            "STOPPED" => InstanceState::Stopped,
            "TERMINATED" => InstanceState::Terminated,
            other => InstanceState::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InstanceState::Absent => "ABSENT",
            InstanceState::Provisioning => "PROVISIONING",
            InstanceState::Running => "RUNNING",
            InstanceState::Stopping => "STOPPING",
            InstanceState::Stopped => "STOPPED",
            InstanceState::Terminated => "TERMINATED",
            InstanceState::Unknown(raw) => raw.as_str(),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, InstanceState::Running)
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// Read model
// -----------------------------------------------------------------------------

/// Snapshot of the managed instance, rebuilt from the provider on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDescriptor {
    pub status: InstanceState,
    /// Only populated while RUNNING and an access config carries a NAT IP.
    pub external_address: Option<String>,
    pub creation_timestamp: String,
    /// Short form (last path segment of the provider resource URL).
    pub machine_type: String,
    /// Short form (last path segment of the provider resource URL).
    pub zone: String,
}

impl InstanceDescriptor {
    pub fn from_resource(instance: &ComputeInstance) -> Self {
        let status = InstanceState::from_provider(&instance.status);
        let external_address = if status.is_running() {
            instance.first_nat_ip().map(|ip| ip.to_string())
        } else {
            None
        };
        Self {
            status,
            external_address,
            creation_timestamp: instance.creation_timestamp.clone(),
            machine_type: short_name(&instance.machine_type).to_string(),
            zone: short_name(&instance.zone).to_string(),
        }
    }
}

/// Result of looking up the managed instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(InstanceDescriptor),
    Absent,
}

impl Lookup {
    pub fn state(&self) -> InstanceState {
        match self {
            Lookup::Found(descriptor) => descriptor.status.clone(),
            Lookup::Absent => InstanceState::Absent,
        }
    }
}

// -----------------------------------------------------------------------------
// Write model (creation only)
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenancePolicy {
    Terminate,
    Migrate,
}

impl MaintenancePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenancePolicy::Terminate => "TERMINATE",
            MaintenancePolicy::Migrate => "MIGRATE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "TERMINATE" => Some(MaintenancePolicy::Terminate),
            "MIGRATE" => Some(MaintenancePolicy::Migrate),
            _ => None,
        }
    }
}

/// Everything the provider needs to create the managed instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    pub name: String,
    /// Short machine type (e.g. `e2-medium`); providers scope it to the zone.
    pub machine_type: String,
    pub boot_disk_image: String,
    pub boot_disk_size_gb: u32,
    pub network: String,
    /// Executed by the instance on first boot. Opaque to the controller.
    pub startup_payload: Vec<u8>,
    pub preemptible: bool,
    pub auto_restart: bool,
    pub on_host_maintenance: MaintenancePolicy,
}

/// Last path segment of a provider resource URL
/// (`.../zones/us-central1-a/machineTypes/e2-medium` -> `e2-medium`).
pub fn short_name(resource: &str) -> &str {
    resource.rsplit('/').next().unwrap_or(resource)
}
