//! Subset of the Compute Engine `Instance` resource the control plane reads.
//!
//! Field names follow the REST representation (camelCase). Anything we do not
//! need is ignored on deserialization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputeInstance {
    pub name: String,
    pub status: String,
    pub creation_timestamp: String,
    /// Fully-qualified machine type URL.
    pub machine_type: String,
    /// Fully-qualified zone URL.
    pub zone: String,
    pub network_interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkInterface {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    pub access_configs: Vec<AccessConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AccessConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "natIP", skip_serializing_if = "Option::is_none")]
    pub nat_ip: Option<String>,
}

impl ComputeInstance {
    /// First NAT IP in interface order, then access-config order.
    pub fn first_nat_ip(&self) -> Option<&str> {
        self.network_interfaces
            .iter()
            .flat_map(|nic| nic.access_configs.iter())
            .find_map(|ac| ac.nat_ip.as_deref().filter(|ip| !ip.is_empty()))
    }
}
