use axum::extract::State;
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use std::sync::Arc;

use crate::app::AppState;
use crate::handlers::admit;
use crate::lifecycle::LifecycleController;
use crate::response::{Endpoint, ErrorResponse, MessageResponse, StatusResponse};

#[utoipa::path(
    get,
    path = "/server-status",
    responses(
        (status = 200, description = "Current state of the server instance", body = StatusResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Instance does not exist", body = MessageResponse),
        (status = 500, description = "Credential or provider failure", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn server_status(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let endpoint = Endpoint::STATUS;
    let provider = match admit(&state, endpoint, &method, &headers).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let result = LifecycleController::new(provider.as_ref(), &state.target)
        .status()
        .await;
    endpoint.shape(result)
}

#[utoipa::path(
    post,
    path = "/start-server",
    responses(
        (status = 200, description = "Instance created, started or already running", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 500, description = "Credential or provider failure", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn start_server(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let endpoint = Endpoint::START;
    let provider = match admit(&state, endpoint, &method, &headers).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let result = LifecycleController::new(provider.as_ref(), &state.target)
        .start(&state.settings.instance)
        .await;
    endpoint.shape(result)
}

#[utoipa::path(
    post,
    path = "/stop-server",
    responses(
        (status = 200, description = "Stop requested, or instance already not running", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Instance does not exist", body = MessageResponse),
        (status = 500, description = "Credential or provider failure", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn stop_server(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let endpoint = Endpoint::STOP;
    let provider = match admit(&state, endpoint, &method, &headers).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let result = LifecycleController::new(provider.as_ref(), &state.target)
        .stop()
        .await;
    endpoint.shape(result)
}
