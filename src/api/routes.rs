//! API route handlers

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

use super::server::AppState;
use crate::auth::{AuthUser, LoginRequest, LogoutRequest, LogoutResponse};
use crate::error::{Error, Result};
use crate::generate::{CreateGeneration, ListGenerationsQuery};
use crate::users::service::is_valid_email;
use crate::users::NewUser;

/// Unwrap a JSON body, reporting a bad body as a validation error
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| Error::Validation(e.body_text()))
}

// Health check

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Any path without a route
pub async fn not_found() -> Error {
    Error::NotFound
}

// Auth routes

pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewUser>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let user = state.users.register(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let req = body(payload)?;
    if !is_valid_email(&req.email) {
        return Err(Error::Validation("email must be a valid email".to_string()));
    }
    if req.password.is_empty() {
        return Err(Error::Validation("password is required".to_string()));
    }

    let response = state.sessions.login(&req.email, &req.password).await?;
    Ok(Json(response))
}

pub async fn logout(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let req = body(payload)?;
    state.sessions.logout(&req.refresh_token).await?;
    Ok(Json(LogoutResponse::ok()))
}

// Generation routes

pub async fn create_generation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<CreateGeneration>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let generation = state.generations.create(&user.id, body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(generation)))
}

pub async fn list_generations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListGenerationsQuery>,
) -> Result<impl IntoResponse> {
    let generations = state.generations.list(&user.id, query.limit()).await?;
    Ok(Json(generations))
}
