// Application state and router assembly
pub mod state;

pub use state::AppState;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::routes::create_router;

/// Full application: routes, request tracing and state.
pub fn build_app(state: Arc<AppState>) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
