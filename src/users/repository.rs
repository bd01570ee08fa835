//! User storage

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, Row};

use super::models::{User, UserRole};
use crate::error::{Error, Result};

/// Lookup and insert for user accounts. Emails are unique.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Insert a user, failing with `EmailAlreadyTaken` on a duplicate email
    async fn insert(&self, user: User) -> Result<User>;
}

/// In-memory user repository
#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(Error::EmailAlreadyTaken);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }
}

/// PostgreSQL user repository over the `users` table
#[derive(Clone)]
pub struct PgUserRepository {
    client: Arc<Client>,
}

impl PgUserRepository {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

const USER_COLUMNS: &str = "id, name, email, password, role, created_at, updated_at";

fn user_from_row(row: &Row) -> Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password")?,
        role: UserRole::parse(&role)
            .ok_or_else(|| Error::Other(format!("Unknown role in database: {}", role)))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email = $1 LIMIT 1", USER_COLUMNS);
        let row = self.client.query_opt(&query, &[&email]).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = self.client.query_opt(&query, &[&id]).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert(&self, user: User) -> Result<User> {
        let query = format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            USER_COLUMNS
        );
        let result = self
            .client
            .execute(
                &query,
                &[
                    &user.id,
                    &user.name,
                    &user.email,
                    &user.password_hash,
                    &user.role.to_string(),
                    &user.created_at,
                    &user.updated_at,
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => Err(Error::EmailAlreadyTaken),
            Err(e) => Err(Error::Database(e)),
        }
    }
}
