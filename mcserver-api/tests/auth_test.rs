// Integration tests for the auth gate and CORS preflight
mod common;

use axum::http::Method;
use common::{provider_with, server_with, token};
use mcserver_providers::mock::MockProvider;
use serde_json::Value;
use std::sync::Arc;

const ENDPOINTS: [&str; 3] = ["/server-status", "/start-server", "/stop-server"];

#[tokio::test]
async fn test_unauthenticated_requests_rejected_everywhere() {
    let provider = provider_with("RUNNING", vec![vec![Some("1.2.3.4")]]);
    let server = server_with(provider.clone());

    for path in ENDPOINTS {
        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
            let response = server.method(method.clone(), path).await;
            assert_eq!(response.status_code(), 401, "{} {}", method, path);
            let body: Value = response.json();
            assert_eq!(body["error"], "Unauthorized");
            assert_eq!(response.header("access-control-allow-origin"), "*");
        }
    }
    assert_eq!(provider.calls().total(), 0);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let provider = Arc::new(MockProvider::new());
    let server = server_with(provider.clone());

    let response = server
        .post("/start-server")
        .authorization_bearer("not-a-jwt")
        .await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(provider.calls().total(), 0);
}

#[tokio::test]
async fn test_preflight_answers_without_claims_or_provider() {
    let provider = Arc::new(MockProvider::new());
    let server = server_with(provider.clone());

    for (path, methods) in [
        ("/server-status", "GET,OPTIONS"),
        ("/start-server", "POST,OPTIONS"),
        ("/stop-server", "POST,OPTIONS"),
    ] {
        let response = server.method(Method::OPTIONS, path).await;
        assert_eq!(response.status_code(), 200);
        assert!(response.text().is_empty());
        assert_eq!(response.header("access-control-allow-methods"), methods);
        assert_eq!(
            response.header("access-control-allow-headers"),
            "Content-Type,Authorization"
        );
    }
    assert_eq!(provider.calls().total(), 0);
}

#[tokio::test]
async fn test_wrong_verb_with_valid_token() {
    let provider = provider_with("RUNNING", vec![vec![Some("1.2.3.4")]]);
    let server = server_with(provider.clone());

    let response = server.get("/start-server").authorization_bearer(token()).await;
    assert_eq!(response.status_code(), 405);
    assert_eq!(response.header("allow"), "POST,OPTIONS");

    let response = server.post("/server-status").authorization_bearer(token()).await;
    assert_eq!(response.status_code(), 405);
    assert_eq!(provider.calls().total(), 0);
}

#[tokio::test]
async fn test_public_routes_need_no_token() {
    let server = server_with(Arc::new(MockProvider::new()));

    let response = server.get("/").await;
    assert_eq!(response.status_code(), 200);

    let response = server.get("/version").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["backend_version"].is_string());

    let response = server.get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["paths"]["/start-server"]["post"].is_object());
    assert!(body["paths"]["/server-status"]["get"].is_object());
}
