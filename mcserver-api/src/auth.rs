use anyhow::Context;
use axum::http::{header, HeaderMap, Method};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::config::AuthSettings;

/// Identity claims carried by an authenticated request.
pub type Claims = Map<String, Value>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthDecision {
    Allowed,
    Rejected(&'static str),
    /// CORS preflight; answered before any claims check or provider work.
    Preflight,
}

/// Gate every control endpoint runs first. Pure: no I/O, no provider calls.
pub fn authorize(method: &Method, claims: Option<&Claims>) -> AuthDecision {
    if *method == Method::OPTIONS {
        return AuthDecision::Preflight;
    }
    match claims {
        Some(c) if !c.is_empty() => AuthDecision::Allowed,
        _ => AuthDecision::Rejected("unauthorized"),
    }
}

/// Verifies bearer JWTs and exposes their claims.
///
/// With no key configured nothing can be verified, so every request ends up
/// without claims.
pub struct ClaimsVerifier {
    key: Option<(DecodingKey, Validation)>,
}

impl ClaimsVerifier {
    pub fn from_settings(settings: &AuthSettings) -> anyhow::Result<Self> {
        let (key, algorithm) = if let Some(pem) = settings.jwt_public_key.as_deref() {
            let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                .context("AUTH_JWT_PUBLIC_KEY is not a valid RSA public key (PEM)")?;
            (key, Algorithm::RS256)
        } else if let Some(secret) = settings.jwt_secret.as_deref() {
            (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
        } else {
            tracing::warn!("no AUTH_JWT_SECRET or AUTH_JWT_PUBLIC_KEY configured; all control requests will be rejected");
            return Ok(Self { key: None });
        };

        let mut validation = Validation::new(algorithm);
        if let Some(issuer) = settings.issuer.as_deref() {
            validation.set_issuer(&[issuer]);
        }
        match settings.audience.as_deref() {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        Ok(Self {
            key: Some((key, validation)),
        })
    }

    /// Claims of a verified bearer token, or `None` when the token is missing or invalid.
    pub fn claims(&self, headers: &HeaderMap) -> Option<Claims> {
        let (key, validation) = self.key.as_ref()?;
        let token = extract_bearer(headers)?;
        match jsonwebtoken::decode::<Claims>(&token, key, validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("bearer token rejected: {}", e);
                None
            }
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let Some(auth) = headers.get(header::AUTHORIZATION) else {
        return None;
    };
    let Ok(auth) = auth.to_str() else {
        return None;
    };
    let auth = auth.trim();
    let prefix = "Bearer ";
    if auth.len() <= prefix.len() || !auth.starts_with(prefix) {
        return None;
    }
    Some(auth[prefix.len()..].trim().to_string())
}
