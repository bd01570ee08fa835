//! User registration and lookup

use regex::Regex;
use std::sync::{Arc, LazyLock};

use super::models::{NewUser, PublicUser, User};
use super::repository::UserRepository;
use crate::auth::password::{hash_password, MAX_PASSWORD_BYTES};
use crate::error::{Error, Result};

pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Account management on top of a [`UserRepository`]
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new account and return it without the password hash
    pub async fn register(&self, payload: NewUser) -> Result<PublicUser> {
        validate_new_user(&payload)?;

        if self.users.find_by_email(&payload.email).await?.is_some() {
            return Err(Error::EmailAlreadyTaken);
        }

        let password_hash = hash_password(&payload.password)?;
        let user = User::new(payload.name, payload.email, password_hash, payload.role);
        let user = self.users.insert(user).await?;

        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user.into())
    }
}

/// Check a registration payload
pub fn validate_new_user(payload: &NewUser) -> Result<()> {
    if payload.name.trim().is_empty() {
        return Err(Error::Validation("name is required".to_string()));
    }
    if !is_valid_email(&payload.email) {
        return Err(Error::Validation("email must be a valid email".to_string()));
    }
    validate_password(&payload.password)
}

/// Passwords need at least 8 characters with one letter and one digit,
/// and must fit in a bcrypt input
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(Error::Validation(format!(
            "password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(Error::Validation(
            "password must contain at least 1 letter and 1 number".to_string(),
        ));
    }
    Ok(())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
