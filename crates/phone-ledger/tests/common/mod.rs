//! Common test utilities for API tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Method, Request, StatusCode},
    Router,
};
use gemini_client::GeminiClient;
use phone_ledger::{
    api::{create_router, AppState},
    PhoneExtractor,
};
use phone_store::{RecordStore, StagingStore};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::MockServer;

pub const CLIENT_IP: [u8; 4] = [10, 0, 0, 1];

/// Create a Gemini client configured for a mock server.
pub fn test_gemini_client(uri: impl Into<String>) -> GeminiClient {
    GeminiClient::new("test-api-key", uri, "test-model", Duration::from_secs(5)).unwrap()
}

/// App state with in-memory stores. Gemini points at a dead port unless a
/// mock server is given.
pub fn test_state(mock_server: Option<&MockServer>, scratch_dir: &Path) -> AppState {
    let uri = mock_server
        .map(|s| s.uri())
        .unwrap_or_else(|| "http://127.0.0.1:9".into());

    AppState::new(
        RecordStore::memory(),
        StagingStore::memory(),
        PhoneExtractor::new(test_gemini_client(uri), scratch_dir),
    )
}

/// Router whose requests all appear to come from `ip`.
pub fn app_for(state: AppState, ip: [u8; 4]) -> Router {
    create_router(state).layer(MockConnectInfo(SocketAddr::from((ip, 40000))))
}

/// Send a request and decode the JSON reply (`Null` for non-JSON bodies).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}
