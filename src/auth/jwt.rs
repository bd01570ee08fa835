//! JWT token handling

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{crypto, decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// Purpose a token was minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short lived, authorizes requests, never persisted
    Access,
    /// Long lived, persisted so it can be revoked
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    /// Parse the database/wire representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "access" => Some(TokenKind::Access),
            "refresh" => Some(TokenKind::Refresh),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Unique token ID
    pub jti: String,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// Token kind, part of the signed payload
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

impl Claims {
    /// Expiry as a timestamp, `None` if `exp` is outside the calendar range
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Check if token is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// A freshly signed token and when it stops being valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Reasons a token string is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token kind does not match")]
    KindMismatch,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// Signs and verifies access and refresh tokens with one HMAC secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec from auth configuration
    pub fn new(config: &AuthConfig) -> Result<Self> {
        config.validate()?;
        Self::with_lifetimes(
            config.secret.as_bytes(),
            config.access_lifetime()?,
            config.refresh_lifetime()?,
        )
    }

    /// Create a codec from a raw secret and explicit lifetimes
    pub fn with_lifetimes(
        secret: &[u8],
        access_lifetime: Duration,
        refresh_lifetime: Duration,
    ) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Config("token signing secret is empty".to_string()));
        }
        if access_lifetime < Duration::seconds(1) || refresh_lifetime < Duration::seconds(1) {
            return Err(Error::Config(
                "token lifetimes must be at least one second".to_string(),
            ));
        }

        // Expiry is checked in `verify_at` so that it happens after the
        // signature check and without leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_lifetime,
            refresh_lifetime,
        })
    }

    /// Configured lifetime for a kind
    pub fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_lifetime,
            TokenKind::Refresh => self.refresh_lifetime,
        }
    }

    /// Create a token for `subject` valid from now
    pub fn issue(&self, subject: &str, kind: TokenKind) -> Result<SignedToken> {
        self.issue_at(subject, kind, Utc::now())
    }

    /// Create a token for `subject` as if issued at `now`
    pub fn issue_at(&self, subject: &str, kind: TokenKind, now: DateTime<Utc>) -> Result<SignedToken> {
        let expires_at = now
            .checked_add_signed(self.lifetime(kind))
            .ok_or_else(|| Error::Config(format!("{} token expiry is out of range", kind)))?;
        let claims = Claims {
            sub: subject.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            kind,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(SignedToken { token, expires_at })
    }

    /// Validate a token of the expected kind against the current time
    pub fn verify(&self, token: &str, expected: TokenKind) -> std::result::Result<Claims, TokenError> {
        self.verify_at(token, expected, Utc::now())
    }

    /// Validate a token of the expected kind as of `now`.
    ///
    /// The HMAC over `header.payload` is checked before either segment is
    /// parsed, so an altered token is `InvalidSignature` whichever byte was
    /// changed and whatever its claimed expiry or kind. `Malformed` means the
    /// string is not three base64url segments, or it is correctly signed but
    /// its claims do not decode.
    pub fn verify_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> std::result::Result<Claims, TokenError> {
        let (message, signature) = split_signed(token).ok_or(TokenError::Malformed)?;
        if !matches!(
            crypto::verify(signature, message.as_bytes(), &self.decoding, Algorithm::HS256),
            Ok(true)
        ) {
            return Err(TokenError::InvalidSignature);
        }

        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        if claims.kind != expected {
            return Err(TokenError::KindMismatch);
        }
        Ok(claims)
    }
}

/// Split a compact JWS into its signed message and signature
fn split_signed(token: &str) -> Option<(&str, &str)> {
    let (message, signature) = token.rsplit_once('.')?;
    let (header, payload) = message.split_once('.')?;
    let well_formed = [header, payload, signature].iter().all(|segment| {
        !segment.is_empty()
            && segment
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    });
    well_formed.then_some((message, signature))
}
