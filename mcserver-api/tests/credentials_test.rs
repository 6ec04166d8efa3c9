// Integration tests for lazy credential resolution
mod common;

use common::{server_from, settings, token};
use serde_json::Value;

#[tokio::test]
async fn test_missing_key_is_500_for_authorized_request() {
    let server = server_from(settings(&[]));

    let response = server.get("/server-status").authorization_bearer(token()).await;
    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "GCP_SERVICE_ACCOUNT_KEY is not set");
}

#[tokio::test]
async fn test_invalid_key_is_500_with_decode_error() {
    let server = server_from(settings(&[("GCP_SERVICE_ACCOUNT_KEY", "%%%not-base64%%%")]));

    let response = server.post("/start-server").authorization_bearer(token()).await;
    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("not valid base64"), "{}", error);
}

#[tokio::test]
async fn test_unauthorized_wins_over_bad_credential() {
    let server = server_from(settings(&[("GCP_SERVICE_ACCOUNT_KEY", "%%%not-base64%%%")]));

    let response = server.post("/stop-server").await;
    assert_eq!(response.status_code(), 401);

    let response = server.method(axum::http::Method::OPTIONS, "/stop-server").await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_mock_provider_from_settings() {
    let server = server_from(settings(&[("PROVIDER", "mock")]));

    let response = server.get("/server-status").authorization_bearer(token()).await;
    assert_eq!(response.status_code(), 404);

    let response = server.post("/start-server").authorization_bearer(token()).await;
    assert_eq!(response.status_code(), 200);

    let response = server.get("/server-status").authorization_bearer(token()).await;
    let body: Value = response.json();
    assert_eq!(body["status"], "RUNNING");
}
