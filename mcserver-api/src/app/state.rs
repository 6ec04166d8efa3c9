use std::sync::Arc;

use mcserver_providers::ComputeProvider;

use crate::auth::ClaimsVerifier;
use crate::config::{InstanceTarget, Settings};
use crate::provider_manager::ProviderManager;

pub struct AppState {
    pub settings: Settings,
    pub target: InstanceTarget,
    pub verifier: ClaimsVerifier,
    pub providers: ProviderManager,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Arc<Self>> {
        let providers = ProviderManager::from_settings(&settings);
        Self::build(settings, providers)
    }

    /// State bound to an already-built provider.
    pub fn with_provider(
        settings: Settings,
        provider: Arc<dyn ComputeProvider>,
    ) -> anyhow::Result<Arc<Self>> {
        Self::build(settings, ProviderManager::preloaded(provider))
    }

    fn build(settings: Settings, providers: ProviderManager) -> anyhow::Result<Arc<Self>> {
        let verifier = ClaimsVerifier::from_settings(&settings.auth)?;
        Ok(Arc::new(Self {
            target: settings.target(),
            settings,
            verifier,
            providers,
        }))
    }
}
