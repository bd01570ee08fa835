//! HTTP API tests
//! Drives the in-memory router directly, no socket needed

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{get_with_token, post_json, post_json_with_token, test_app, test_config, PASSWORD};

fn register_body(email: &str) -> serde_json::Value {
    json!({
        "name": "Test User",
        "email": email,
        "password": PASSWORD,
        "role": "user",
    })
}

async fn register_and_login(app: &axum::Router, email: &str) -> serde_json::Value {
    let (status, _) = post_json(app, "/v1/auth/register", register_body(email)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(
        app,
        "/v1/auth/login",
        json!({ "email": email, "password": PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app(&test_config());
    let (status, body) = get_with_token(&app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_returns_json_not_found() {
    let (app, _) = test_app(&test_config());

    for path in ["/v1/nonexistent-endpoint", "/v1/does-not-exist"] {
        let (status, body) = get_with_token(&app, path, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
        assert_eq!(body["message"], "Not found");
    }
}

#[tokio::test]
async fn test_register_returns_user_without_password() {
    let (app, _) = test_app(&test_config());
    let (status, body) = post_json(&app, "/v1/auth/register", register_body("test@example.com")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_string());
    assert_eq!(body["email"], "test@example.com");
    assert_eq!(body["name"], "Test User");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (app, _) = test_app(&test_config());
    post_json(&app, "/v1/auth/register", register_body("test@example.com")).await;
    let (status, body) = post_json(&app, "/v1/auth/register", register_body("test@example.com")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email is already taken");
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_register_validation() {
    let (app, _) = test_app(&test_config());

    let (status, _) = post_json(&app, "/v1/auth/register", register_body("invalid-email")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut weak = register_body("weak@example.com");
    weak["password"] = json!("123");
    let (status, body) = post_json(&app, "/v1/auth/register", weak).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _) = post_json(
        &app,
        "/v1/auth/register",
        json!({ "email": "noname@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_password_longer_than_bcrypt_input() {
    let (app, _) = test_app(&test_config());
    let mut long = register_body("long@example.com");
    long["password"] = json!(format!("{}1", "a".repeat(80)));

    let (status, body) = post_json(&app, "/v1/auth/register", long).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_login_returns_token_pair() {
    let (app, _) = test_app(&test_config());
    let body = register_and_login(&app, "login@example.com").await;

    assert_eq!(body["user"]["email"], "login@example.com");
    assert!(body["user"].get("password").is_none());
    assert!(body["token"]["access"]["token"].is_string());
    assert!(body["token"]["refresh"]["token"].is_string());
    assert!(body["token"]["access"]["expires"].is_string());
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let (app, _) = test_app(&test_config());
    register_and_login(&app, "login@example.com").await;

    let (wrong_status, wrong_body) = post_json(
        &app,
        "/v1/auth/login",
        json!({ "email": "login@example.com", "password": "WrongPassword123!" }),
    )
    .await;
    let (unknown_status, unknown_body) = post_json(
        &app,
        "/v1/auth/login",
        json!({ "email": "nonexistent@example.com", "password": PASSWORD }),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Incorrect email or password");
}

#[tokio::test]
async fn test_login_bad_body() {
    let (app, _) = test_app(&test_config());

    let (status, _) = post_json(
        &app,
        "/v1/auth/login",
        json!({ "email": "invalid-email", "password": PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(&app, "/v1/auth/login", json!({ "email": "a@example.com" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_logout_flow() {
    let (app, _) = test_app(&test_config());
    let login = register_and_login(&app, "logout@example.com").await;
    let refresh = login["token"]["refresh"]["token"].as_str().unwrap();

    let (status, body) = post_json(&app, "/v1/auth/logout", json!({ "refreshToken": refresh })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User logout successfully!");

    let (status, body) = post_json(&app, "/v1/auth/logout", json!({ "refreshToken": refresh })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Logout failed");
}

#[tokio::test]
async fn test_logout_with_access_token_fails() {
    let (app, _) = test_app(&test_config());
    let login = register_and_login(&app, "logout@example.com").await;
    let access = login["token"]["access"]["token"].as_str().unwrap();

    let (status, body) = post_json(&app, "/v1/auth/logout", json!({ "refreshToken": access })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Logout failed");
}

#[tokio::test]
async fn test_generate_requires_auth() {
    let (app, _) = test_app(&test_config());

    let (status, body) = get_with_token(&app, "/v1/generate", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Please authenticate");

    let (status, _) = post_json_with_token(
        &app,
        "/v1/generate",
        json!({ "prompt": "A beautiful sunset" }),
        Some("invalid-token"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_generate_rejects_refresh_token() {
    let (app, _) = test_app(&test_config());
    let login = register_and_login(&app, "gen@example.com").await;
    let refresh = login["token"]["refresh"]["token"].as_str().unwrap();

    let (status, _) = get_with_token(&app, "/v1/generate", Some(refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_list_generations() {
    let (app, _) = test_app(&test_config());
    let login = register_and_login(&app, "gen@example.com").await;
    let access = login["token"]["access"]["token"].as_str().unwrap();
    let user_id = login["user"]["id"].as_str().unwrap();

    let (status, created) = post_json_with_token(
        &app,
        "/v1/generate",
        json!({
            "prompt": "A beautiful sunset over mountains",
            "style": "realistic",
            "imageUpload": "data:image/png;base64,iVBORw0KGgo=",
        }),
        Some(access),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["prompt"], "A beautiful sunset over mountains");
    assert_eq!(created["style"], "realistic");
    assert_eq!(created["originalImage"], "data:image/png;base64,iVBORw0KGgo=");
    assert_eq!(created["status"], "completed");
    assert_eq!(created["userId"], user_id);
    assert!(created["imageUrl"].is_string());

    let (status, listed) = get_with_token(&app, "/v1/generate?limit=3", Some(access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_generations_are_per_user() {
    let (app, _) = test_app(&test_config());
    let alice = register_and_login(&app, "alice@example.com").await;
    let bob = register_and_login(&app, "bob@example.com").await;
    let alice_token = alice["token"]["access"]["token"].as_str().unwrap();
    let bob_token = bob["token"]["access"]["token"].as_str().unwrap();

    post_json_with_token(&app, "/v1/generate", json!({ "prompt": "mine" }), Some(alice_token)).await;

    let (_, listed) = get_with_token(&app, "/v1/generate", Some(bob_token)).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_generate_validation() {
    let (app, _) = test_app(&test_config());
    let login = register_and_login(&app, "gen@example.com").await;
    let access = login["token"]["access"]["token"].as_str().unwrap();

    let (status, _) = post_json_with_token(&app, "/v1/generate", json!({ "prompt": "" }), Some(access)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json_with_token(&app, "/v1/generate", json!({}), Some(access)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_overloaded() {
    let mut config = test_config();
    config.generate.overload_rate = 1.0;
    let (app, _) = test_app(&config);
    let login = register_and_login(&app, "gen@example.com").await;
    let access = login["token"]["access"]["token"].as_str().unwrap();

    let (status, body) = post_json_with_token(
        &app,
        "/v1/generate",
        json!({ "prompt": "A beautiful sunset" }),
        Some(access),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Model overloaded");
}

#[tokio::test]
async fn test_access_token_still_works_after_logout() {
    let (app, _) = test_app(&test_config());
    let login = register_and_login(&app, "gen@example.com").await;
    let access = login["token"]["access"]["token"].as_str().unwrap();
    let refresh = login["token"]["refresh"]["token"].as_str().unwrap();

    let (status, _) = post_json(&app, "/v1/auth/logout", json!({ "refreshToken": refresh })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_with_token(&app, "/v1/generate", Some(access)).await;
    assert_eq!(status, StatusCode::OK);
}
