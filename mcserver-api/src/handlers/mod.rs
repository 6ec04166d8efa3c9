// Handlers module - control endpoints
pub mod server;

use axum::http::{HeaderMap, Method};
use axum::response::Response;
use mcserver_common::ControlError;
use mcserver_providers::ComputeProvider;
use std::sync::Arc;

use crate::app::AppState;
use crate::auth::{authorize, AuthDecision};
use crate::response::Endpoint;

/// Runs the auth gate, the verb check and provider acquisition, in that
/// order. `Err` carries the finished response.
pub(crate) async fn admit(
    state: &AppState,
    endpoint: Endpoint,
    method: &Method,
    headers: &HeaderMap,
) -> Result<Arc<dyn ComputeProvider>, Response> {
    let claims = state.verifier.claims(headers);
    match authorize(method, claims.as_ref()) {
        AuthDecision::Preflight => return Err(endpoint.preflight()),
        AuthDecision::Rejected(reason) => {
            tracing::info!("[{}] {} rejected: {}", endpoint.name, method, reason);
            return Err(endpoint.shape(ControlError::Unauthorized));
        }
        AuthDecision::Allowed => {}
    }

    if !endpoint.accepts(method) {
        return Err(endpoint.method_not_allowed());
    }

    let subject = claims
        .as_ref()
        .and_then(|c| c.get("sub"))
        .and_then(|v| v.as_str())
        .unwrap_or("-");
    tracing::info!("[{}] {} by {}", endpoint.name, method, subject);

    state
        .providers
        .get_provider()
        .await
        .map_err(|e| endpoint.shape(e))
}
