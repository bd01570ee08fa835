//! Authentication middleware and extractors

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::error::{Error, Result};

/// Get the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware for requiring authentication.
///
/// On success the caller's [`AuthUser`] is available to handlers as an
/// `Extension`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(req.headers())
        .ok_or(Error::Unauthorized)?
        .to_string();

    let user: AuthUser = state.sessions.authorize(&token).await?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
