// Public routes (no authentication required)
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::api_docs;
use crate::app::AppState;
use crate::version;

pub fn create_public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/version", get(get_version))
        .route("/api-docs/openapi.json", get(openapi))
}

async fn get_version() -> Json<version::VersionInfo> {
    Json(version::get_version_info())
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(api_docs::ApiDoc::openapi())
}

async fn root() -> &'static str {
    "Minecraft Server Control API"
}
