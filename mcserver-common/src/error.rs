use thiserror::Error;

/// Failure talking to the compute provider.
///
/// `status` and `reason` come from the provider's error payload when there is
/// one; transport failures carry neither.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub status: Option<u16>,
    pub reason: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn http(status: u16, reason: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            reason,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            reason: None,
            message: message.into(),
        }
    }

    /// Only an explicit 404 / `notFound` means the resource does not exist.
    /// Permission, quota and network failures must never be read as absence.
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404) || self.reason.as_deref() == Some("notFound")
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("{0} is not set")]
    Missing(String),
    #[error("service account key is not valid base64: {0}")]
    Base64(String),
    #[error("service account key is not valid JSON: {0}")]
    Json(String),
    #[error("access token exchange failed: {0}")]
    Exchange(String),
}

/// Errors a control endpoint can end up with; each maps to one response shape.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Server not found")]
    NotFound,
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("{0}")]
    Internal(String),
}
