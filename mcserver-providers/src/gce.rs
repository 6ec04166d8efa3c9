use crate::credentials::{ServiceAccountKey, TokenSource};
use crate::{ComputeProvider, Operation};
use async_trait::async_trait;
use mcserver_common::{ComputeInstance, CredentialError, InstanceSpec, ProviderError};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://compute.googleapis.com/compute/v1";

/// Compute Engine REST client (instances collection only).
pub struct GceProvider {
    client: Client,
    base_url: String,
    tokens: TokenSource,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    #[serde(default)]
    reason: Option<String>,
}

impl GceProvider {
    pub fn new(key: ServiceAccountKey) -> Result<Self, ProviderError> {
        Self::with_base_url(key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(key: ServiceAccountKey, base_url: &str) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| ProviderError::transport(e.to_string()))?;
        Ok(Self {
            tokens: TokenSource::new(key, client.clone()),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Perform the first token exchange so bad key material is reported as a
    /// credential failure rather than a provider failure on the first call.
    pub async fn authenticate(&self) -> Result<(), CredentialError> {
        self.tokens.access_token().await.map(|_| ())
    }

    fn instances_url(&self, project: &str, zone: &str) -> String {
        format!("{}/projects/{}/zones/{}/instances", self.base_url, project, zone)
    }

    async fn bearer(&self) -> Result<String, ProviderError> {
        self.tokens
            .access_token()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))
    }

    async fn post_action(
        &self,
        project: &str,
        zone: &str,
        name: &str,
        action: &str,
    ) -> Result<Operation, ProviderError> {
        let url = format!("{}/{}/{}", self.instances_url(project, zone), name, action);
        tracing::info!("[GCE API] POST {} - {} instance {}", url, action, name);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;
        let op: Operation = parse_response(&url, resp).await?;
        tracing::info!("[GCE API] {} accepted: operation={} status={}", action, op.name, op.status);
        Ok(op)
    }
}

/// Map a non-success response to a classified `ProviderError`, or decode the body.
async fn parse_response<T: serde::de::DeserializeOwned>(
    url: &str,
    resp: Response,
) -> Result<T, ProviderError> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        let err = classify_error(status.as_u16(), &text);
        if err.is_not_found() {
            tracing::debug!("[GCE API] {} -> not found", url);
        } else {
            tracing::warn!(
                "[GCE API] {} failed: status={} response={}",
                url,
                status.as_u16(),
                text
            );
        }
        return Err(err);
    }
    resp.json::<T>()
        .await
        .map_err(|e| ProviderError::transport(format!("invalid response from {}: {}", url, e)))
}

/// Build a `ProviderError` from an HTTP status and the raw error body.
pub fn classify_error(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let reason = envelope.error.errors.into_iter().find_map(|e| e.reason);
            let message = if envelope.error.message.is_empty() {
                format!("Compute API returned status {}", status)
            } else {
                envelope.error.message
            };
            ProviderError::http(status, reason, message)
        }
        Err(_) => {
            let message = if body.trim().is_empty() {
                format!("Compute API returned status {}", status)
            } else {
                body.trim().to_string()
            };
            ProviderError::http(status, None, message)
        }
    }
}

/// REST body for `instances.insert`.
pub fn instance_body(zone: &str, spec: &InstanceSpec) -> serde_json::Value {
    json!({
        "name": spec.name,
        "machineType": format!("zones/{}/machineTypes/{}", zone, spec.machine_type),
        "disks": [{
            "boot": true,
            "autoDelete": true,
            "initializeParams": {
                "sourceImage": spec.boot_disk_image,
                "diskSizeGb": spec.boot_disk_size_gb.to_string(),
            }
        }],
        "networkInterfaces": [{
            "network": spec.network,
            "accessConfigs": [{"name": "External NAT", "type": "ONE_TO_ONE_NAT"}]
        }],
        "metadata": {
            "items": [{
                "key": "startup-script",
                "value": String::from_utf8_lossy(&spec.startup_payload),
            }]
        },
        "scheduling": {
            "preemptible": spec.preemptible,
            "automaticRestart": spec.auto_restart,
            "onHostMaintenance": spec.on_host_maintenance.as_str(),
        }
    })
}

#[async_trait]
impl ComputeProvider for GceProvider {
    async fn get_instance(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> Result<ComputeInstance, ProviderError> {
        let url = format!("{}/{}", self.instances_url(project, zone), name);
        tracing::debug!("[GCE API] GET {}", url);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(self.bearer().await?)
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;
        parse_response(&url, resp).await
    }

    async fn insert_instance(
        &self,
        project: &str,
        zone: &str,
        spec: &InstanceSpec,
    ) -> Result<Operation, ProviderError> {
        let url = self.instances_url(project, zone);
        tracing::info!(
            "[GCE API] POST {} - Creating instance: name={}, type={}, image={}, preemptible={}",
            url,
            spec.name,
            spec.machine_type,
            spec.boot_disk_image,
            spec.preemptible
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&instance_body(zone, spec))
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;
        let op: Operation = parse_response(&url, resp).await?;
        tracing::info!("[GCE API] insert accepted: operation={} status={}", op.name, op.status);
        Ok(op)
    }

    async fn start_instance(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> Result<Operation, ProviderError> {
        self.post_action(project, zone, name, "start").await
    }

    async fn stop_instance(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> Result<Operation, ProviderError> {
        self.post_action(project, zone, name, "stop").await
    }
}
