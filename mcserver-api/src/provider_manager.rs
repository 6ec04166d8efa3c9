use mcserver_common::ControlError;
use mcserver_providers::credentials::resolve_credential;
use mcserver_providers::gce::GceProvider;
use mcserver_providers::mock::MockProvider;
use mcserver_providers::ComputeProvider;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::config::{Settings, PROVIDER_GCE, PROVIDER_MOCK};

/// Builds the compute client on first use and hands out the same one afterwards.
///
/// A failed build (bad credential, token exchange error) is not remembered,
/// so the next request tries again.
pub struct ProviderManager {
    provider_name: String,
    service_account_key: Option<String>,
    provider: OnceCell<Arc<dyn ComputeProvider>>,
}

impl ProviderManager {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            provider_name: settings.provider.clone(),
            service_account_key: settings.service_account_key.clone(),
            provider: OnceCell::new(),
        }
    }

    /// A manager that always returns `provider` (tests, embedding).
    pub fn preloaded(provider: Arc<dyn ComputeProvider>) -> Self {
        Self {
            provider_name: "preloaded".to_string(),
            service_account_key: None,
            provider: OnceCell::new_with(Some(provider)),
        }
    }

    pub async fn get_provider(&self) -> Result<Arc<dyn ComputeProvider>, ControlError> {
        self.provider
            .get_or_try_init(|| self.build())
            .await
            .map(Arc::clone)
    }

    async fn build(&self) -> Result<Arc<dyn ComputeProvider>, ControlError> {
        match self.provider_name.as_str() {
            PROVIDER_GCE => {
                let key = resolve_credential(self.service_account_key.as_deref())?;
                tracing::info!(
                    "[provider] building Compute Engine client for {}",
                    key.client_email
                );
                let provider = GceProvider::new(key)?;
                provider.authenticate().await?;
                Ok(Arc::new(provider))
            }
            PROVIDER_MOCK => {
                tracing::warn!("[provider] using in-memory mock provider");
                Ok(Arc::new(MockProvider::new()))
            }
            other => Err(ControlError::Internal(format!(
                "unknown provider '{}'",
                other
            ))),
        }
    }
}
