//! Session management
//!
//! Login, logout and request authorization on top of the password hasher,
//! the token codec and the token store. This is the only place where
//! fine-grained token and lookup failures are turned into the coarse errors
//! callers see: `InvalidCredentials`, `LogoutFailed` and `Unauthorized`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::auth::jwt::{TokenCodec, TokenError, TokenKind};
use crate::auth::models::{AuthTokens, AuthUser, LoginResponse};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::store::TokenStore;
use crate::error::{Error, Result};
use crate::users::{User, UserRepository};

/// Why a logout was refused. Logged, never returned.
#[derive(Debug)]
enum LogoutRejection {
    Token(TokenError),
    NotStored,
    UnknownUser,
    Storage(Error),
}

impl fmt::Display for LogoutRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoutRejection::Token(e) => write!(f, "{}", e),
            LogoutRejection::NotStored => write!(f, "refresh token not stored or revoked"),
            LogoutRejection::UnknownUser => write!(f, "user not found for refresh token"),
            LogoutRejection::Storage(e) => write!(f, "storage error: {}", e),
        }
    }
}

/// Hash compared against when the email is unknown, so both login
/// failure paths cost one bcrypt verification. Computed once per process.
fn decoy_hash() -> Result<&'static str> {
    static DECOY: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DECOY.get() {
        return Ok(hash);
    }
    let hash = hash_password("decoy-password-never-matches")?;
    Ok(DECOY.get_or_init(|| hash))
}

/// Login, logout and authorization
#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenStore>,
    codec: Arc<TokenCodec>,
    decoy: &'static str,
}

impl SessionService {
    /// Fails only if the decoy hash cannot be computed
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenStore>,
        codec: Arc<TokenCodec>,
    ) -> Result<Self> {
        Ok(Self {
            users,
            tokens,
            codec,
            decoy: decoy_hash()?,
        })
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Check credentials and start a session.
    ///
    /// An unknown email and a wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            Some(_) => {
                tracing::info!("Login rejected");
                return Err(Error::InvalidCredentials);
            }
            None => {
                verify_password(password, self.decoy);
                tracing::info!("Login rejected");
                return Err(Error::InvalidCredentials);
            }
        };

        let token = self.generate_auth_tokens(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            user: user.into(),
            token,
        })
    }

    /// Mint an access/refresh pair and persist the refresh token
    pub async fn generate_auth_tokens(&self, user: &User) -> Result<AuthTokens> {
        let access = self.codec.issue(&user.id, TokenKind::Access)?;
        let refresh = self.codec.issue(&user.id, TokenKind::Refresh)?;

        self.tokens
            .save(&user.id, TokenKind::Refresh, &refresh.token, refresh.expires_at)
            .await?;

        Ok(AuthTokens {
            access: access.into(),
            refresh: refresh.into(),
        })
    }

    /// End every session of the refresh token's owner.
    ///
    /// Revocation is per user, not per token: all refresh tokens of the
    /// owner are deleted, not only the one presented.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        match self.revoke_refresh_tokens(refresh_token).await {
            Ok((user_id, revoked)) => {
                tracing::info!(user_id = %user_id, revoked, "User logged out");
                Ok(())
            }
            Err(LogoutRejection::Storage(e)) => {
                tracing::warn!(error = %e, "Logout failed on storage");
                Err(Error::LogoutFailed)
            }
            Err(rejection) => {
                tracing::debug!(reason = %rejection, "Logout rejected");
                Err(Error::LogoutFailed)
            }
        }
    }

    async fn revoke_refresh_tokens(
        &self,
        refresh_token: &str,
    ) -> std::result::Result<(String, u64), LogoutRejection> {
        let claims = self
            .codec
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(LogoutRejection::Token)?;

        let record = self
            .tokens
            .find(refresh_token, TokenKind::Refresh)
            .await
            .map_err(LogoutRejection::Storage)?
            .filter(|record| record.user_id == claims.sub)
            .ok_or(LogoutRejection::NotStored)?;

        let user = self
            .users
            .find_by_id(&record.user_id)
            .await
            .map_err(LogoutRejection::Storage)?
            .ok_or(LogoutRejection::UnknownUser)?;

        let revoked = self
            .tokens
            .delete_by_user(&user.id, TokenKind::Refresh)
            .await
            .map_err(LogoutRejection::Storage)?;

        Ok((user.id, revoked))
    }

    /// Drop refresh token records that are past their expiry
    pub async fn purge_expired_tokens(&self) -> Result<u64> {
        self.tokens.delete_expired().await
    }

    /// Resolve an access token to its user.
    ///
    /// Access tokens are stateless: the token store is not consulted, so a
    /// token stays usable until it expires even after logout.
    pub async fn authorize(&self, access_token: &str) -> Result<AuthUser> {
        let claims = self
            .codec
            .verify(access_token, TokenKind::Access)
            .map_err(|e| {
                tracing::debug!(reason = %e, "Access token rejected");
                Error::Unauthorized
            })?;

        let user = self.users.find_by_id(&claims.sub).await?.ok_or_else(|| {
            tracing::debug!(user_id = %claims.sub, "Access token for unknown user");
            Error::Unauthorized
        })?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}
