use async_trait::async_trait;
use mcserver_common::{ComputeInstance, InstanceSpec, ProviderError};
use serde::Deserialize;

pub mod credentials;

/// Compute operations the lifecycle controller needs from a cloud provider.
///
/// Mutating calls return as soon as the provider has accepted the operation;
/// none of them wait for the instance to reach its target state.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// Fetch the instance resource. A missing instance must surface as a
    /// `ProviderError` for which `is_not_found()` holds.
    async fn get_instance(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> Result<ComputeInstance, ProviderError>;

    async fn insert_instance(
        &self,
        project: &str,
        zone: &str,
        spec: &InstanceSpec,
    ) -> Result<Operation, ProviderError>;

    async fn start_instance(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> Result<Operation, ProviderError>;

    async fn stop_instance(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> Result<Operation, ProviderError>;
}

/// Handle of an accepted provider operation. Never polled to completion.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Operation {
    pub name: String,
    pub status: String,
}

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "gce")]
pub mod gce;
