// Library entry point for tests and external usage

pub mod api_docs;
pub mod app;
pub mod auth;
pub mod config;
pub mod handlers;
pub mod lifecycle;
pub mod provider_manager;
pub mod response;
pub mod routes;
pub mod version;

// Re-export commonly used types
pub use app::{build_app, AppState};
pub use config::Settings;
