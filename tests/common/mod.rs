//! Shared helpers for integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use genstudio::api::{create_router, AppState};
use genstudio::config::{AuthConfig, Config};

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-tokens";
pub const PASSWORD: &str = "Password123!";

/// Config with a signing secret and an instant, never failing generator
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth = AuthConfig::with_secret(TEST_SECRET);
    config.generate.min_delay_ms = 0;
    config.generate.max_delay_ms = 0;
    config.generate.overload_rate = 0.0;
    config
}

pub fn test_app(config: &Config) -> (Router, AppState) {
    let state = AppState::in_memory(config).expect("test config should be valid");
    (create_router(state.clone()), state)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response<Body> = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_json_with_token(app, uri, body, None).await
}

pub async fn post_json_with_token(
    app: &Router,
    uri: &str,
    body: Value,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn get_with_token(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

/// Replace one base64url character of a JWT segment with a different one
pub fn flip_char(token: &str, segment: usize) -> String {
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let part = &mut parts[segment];
    let mid = part.len() / 2;
    let original = part.as_bytes()[mid];
    let replacement = if original == b'A' { 'B' } else { 'A' };
    part.replace_range(mid..mid + 1, &replacement.to_string());
    parts.join(".")
}
