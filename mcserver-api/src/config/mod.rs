// Process configuration, read once at startup
pub mod instance;

pub use instance::InstanceTemplate;

use anyhow::{anyhow, Context, Result};
use mcserver_common::DEFAULT_INSTANCE_NAME;
use std::fmt;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8003";
pub const PROVIDER_GCE: &str = "gce";
pub const PROVIDER_MOCK: &str = "mock";

/// Identifies the one instance every endpoint operates on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceTarget {
    pub project: String,
    pub zone: String,
    pub name: String,
}

#[derive(Clone, Default)]
pub struct AuthSettings {
    /// HS256 shared secret.
    pub jwt_secret: Option<String>,
    /// RS256 public key (PEM), e.g. the identity provider's signing key.
    pub jwt_public_key: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Clone)]
pub struct Settings {
    pub provider: String,
    pub project_id: String,
    pub zone: String,
    pub instance_name: String,
    /// Base64 JSON service-account key. Decoded lazily on the first authorized request.
    pub service_account_key: Option<String>,
    pub instance: InstanceTemplate,
    pub auth: AuthSettings,
    pub bind_addr: SocketAddr,
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}

// Secrets stay out of logs; only their presence is shown.
impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &redacted(&self.jwt_secret))
            .field("jwt_public_key", &self.jwt_public_key.is_some())
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("provider", &self.provider)
            .field("project_id", &self.project_id)
            .field("zone", &self.zone)
            .field("instance_name", &self.instance_name)
            .field("service_account_key", &redacted(&self.service_account_key))
            .field("instance", &self.instance)
            .field("auth", &self.auth)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_source(|name| std::env::var(name).ok())
    }

    /// Build settings from any key lookup (the environment in production, a map in tests).
    pub fn from_source<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            get(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let required = |name: &str| var(name).ok_or_else(|| anyhow!("{} must be set", name));

        let provider = var("PROVIDER")
            .unwrap_or_else(|| PROVIDER_GCE.to_string())
            .to_ascii_lowercase();
        if provider != PROVIDER_GCE && provider != PROVIDER_MOCK {
            return Err(anyhow!(
                "PROVIDER must be '{}' or '{}', got '{}'",
                PROVIDER_GCE,
                PROVIDER_MOCK,
                provider
            ));
        }

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR is not a valid socket address")?;

        Ok(Self {
            provider,
            project_id: required("GCP_PROJECT_ID")?,
            zone: required("GCP_ZONE")?,
            instance_name: var("INSTANCE_NAME").unwrap_or_else(|| DEFAULT_INSTANCE_NAME.to_string()),
            service_account_key: var("GCP_SERVICE_ACCOUNT_KEY"),
            instance: InstanceTemplate::from_source(&var)?,
            auth: AuthSettings {
                jwt_secret: var("AUTH_JWT_SECRET"),
                jwt_public_key: var("AUTH_JWT_PUBLIC_KEY"),
                issuer: var("AUTH_JWT_ISSUER"),
                audience: var("AUTH_JWT_AUDIENCE"),
            },
            bind_addr,
        })
    }

    pub fn target(&self) -> InstanceTarget {
        InstanceTarget {
            project: self.project_id.clone(),
            zone: self.zone.clone(),
            name: self.instance_name.clone(),
        }
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
