// Routes module - Centralizes all route definitions
pub mod public;

use axum::routing::any;
use axum::Router;
use std::sync::Arc;

use crate::app::AppState;
use crate::handlers::server;
use crate::response::Endpoint;

/// Build the main application router.
///
/// Control endpoints accept every verb so the auth gate sees the request
/// before any method check.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(public::create_public_routes())
        .route(&Endpoint::STATUS.path(), any(server::server_status))
        .route(&Endpoint::START.path(), any(server::start_server))
        .route(&Endpoint::STOP.path(), any(server::stop_server))
}
