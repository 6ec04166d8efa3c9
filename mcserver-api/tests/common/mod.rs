// Common test utilities and fixtures
#![allow(dead_code)]

use axum_test::TestServer;
use jsonwebtoken::{EncodingKey, Header};
use mcserver_api::{build_app, AppState, Settings};
use mcserver_providers::mock::MockProvider;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SECRET: &str = "integration-secret";
pub const PROJECT: &str = "mc-project";
pub const ZONE: &str = "europe-west1-b";
pub const NAME: &str = "minecraft-server";

/// Settings as read from an environment holding `pairs` on top of the
/// project, zone and JWT secret every test needs.
pub fn settings(pairs: &[(&str, &str)]) -> Settings {
    let mut map: HashMap<String, String> = [
        ("GCP_PROJECT_ID", PROJECT),
        ("GCP_ZONE", ZONE),
        ("AUTH_JWT_SECRET", SECRET),
    ]
    .iter()
    .chain(pairs.iter())
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    map.retain(|_, v| !v.is_empty());
    Settings::from_source(move |k| map.get(k).cloned()).expect("test settings")
}

/// A signed token the server accepts.
pub fn token() -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 600;
    jsonwebtoken::encode(
        &Header::default(),
        &json!({"sub": "player-1", "email": "player@example.com", "exp": exp}),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// Server wired to `provider`; the caller keeps a handle to inspect calls.
pub fn server_with(provider: Arc<MockProvider>) -> TestServer {
    let state = AppState::with_provider(settings(&[]), provider).unwrap();
    TestServer::new(build_app(state)).unwrap()
}

/// Server that builds its provider from `settings` on first use.
pub fn server_from(settings: Settings) -> TestServer {
    let state = AppState::new(settings).unwrap();
    TestServer::new(build_app(state)).unwrap()
}

pub fn provider_with(status: &str, interfaces: Vec<Vec<Option<&str>>>) -> Arc<MockProvider> {
    Arc::new(MockProvider::with_instance(MockProvider::instance_record(
        NAME, ZONE, status, interfaces,
    )))
}
