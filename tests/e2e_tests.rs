//! End-to-end test over a real socket
//! Registers, logs in, generates and logs out with an HTTP client

mod common;

use genstudio::api::{serve, AppState};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Start the API on an ephemeral port and return its base URL
async fn start_test_server() -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::in_memory(&common::test_config()).unwrap();

    let handle = tokio::spawn(async move {
        let _ = serve(listener, state).await;
    });
    (format!("http://{}", addr), handle)
}

#[tokio::test]
async fn test_full_session_over_http() {
    let (base, server_handle) = start_test_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/v1/auth/register", base))
        .json(&json!({
            "name": "E2E User",
            "email": "e2e@example.com",
            "password": common::PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let user: Value = response.json().await.unwrap();

    let response = client
        .post(format!("{}/v1/auth/login", base))
        .json(&json!({ "email": "e2e@example.com", "password": common::PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let login: Value = response.json().await.unwrap();
    assert_eq!(login["user"]["id"], user["id"]);

    let access = login["token"]["access"]["token"].as_str().unwrap().to_string();
    let refresh = login["token"]["refresh"]["token"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/v1/generate", base))
        .bearer_auth(&access)
        .json(&json!({ "prompt": "A lighthouse at dusk" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let response = client
        .get(format!("{}/v1/generate", base))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let generations: Value = response.json().await.unwrap();
    assert_eq!(generations.as_array().unwrap().len(), 1);

    let response = client
        .post(format!("{}/v1/auth/logout", base))
        .json(&json!({ "refreshToken": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .post(format!("{}/v1/auth/logout", base))
        .json(&json!({ "refreshToken": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    server_handle.abort();
}
