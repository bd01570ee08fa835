//! Authentication models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::SignedToken;
use crate::users::{PublicUser, UserRole};

/// Login credentials
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Logout body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// One token of a pair as returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub token: String,
    pub expires: DateTime<Utc>,
}

impl From<SignedToken> for TokenInfo {
    fn from(signed: SignedToken) -> Self {
        Self {
            token: signed.token,
            expires: signed.expires_at,
        }
    }
}

/// Access and refresh token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthTokens {
    pub access: TokenInfo,
    pub refresh: TokenInfo,
}

/// Login response with tokens
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub token: AuthTokens,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

impl LogoutResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: "User logout successfully!".to_string(),
        }
    }
}

/// Caller identity attached to an authorized request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub role: UserRole,
}
