//! Refresh token persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::{Client, Row};
use uuid::Uuid;

use crate::auth::jwt::TokenKind;
use crate::error::{Error, Result};

/// One persisted token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub id: String,
    pub user_id: String,
    pub kind: TokenKind,
    /// SHA-256 hex digest of the token string
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn new(user_id: &str, kind: TokenKind, token: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            token_hash: hash_token(token),
            expires_at,
            created_at: Utc::now(),
        }
    }

    /// A record stops counting once its expiry has passed
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Digest stored in place of the raw token
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Storage for revocable tokens.
///
/// `save` appends; several live records for the same user and kind are
/// allowed. `find` never returns an expired record.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn save(
        &self,
        user_id: &str,
        kind: TokenKind,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<TokenRecord>;

    async fn find(&self, token: &str, kind: TokenKind) -> Result<Option<TokenRecord>>;

    /// Remove every record for this user and kind, returning how many went
    async fn delete_by_user(&self, user_id: &str, kind: TokenKind) -> Result<u64>;

    /// Physically drop records whose expiry has passed
    async fn delete_expired(&self) -> Result<u64>;
}

/// In-memory token store
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    records: Arc<RwLock<HashMap<String, TokenRecord>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, expired ones included
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Count live records for a user and kind
    pub async fn count_live(&self, user_id: &str, kind: TokenKind) -> usize {
        let now = Utc::now();
        self.records
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id && r.kind == kind && r.is_live_at(now))
            .count()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save(
        &self,
        user_id: &str,
        kind: TokenKind,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<TokenRecord> {
        let record = TokenRecord::new(user_id, kind, token, expires_at);
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn find(&self, token: &str, kind: TokenKind) -> Result<Option<TokenRecord>> {
        let token_hash = hash_token(token);
        let now = Utc::now();
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|r| r.token_hash == token_hash && r.kind == kind && r.is_live_at(now))
            .cloned())
    }

    async fn delete_by_user(&self, user_id: &str, kind: TokenKind) -> Result<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| !(r.user_id == user_id && r.kind == kind));
        Ok((before - records.len()) as u64)
    }

    async fn delete_expired(&self) -> Result<u64> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.is_live_at(now));
        Ok((before - records.len()) as u64)
    }
}

/// PostgreSQL token store over the `tokens` table
#[derive(Clone)]
pub struct PgTokenStore {
    client: Arc<Client>,
}

impl PgTokenStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

fn record_from_row(row: &Row) -> Result<TokenRecord> {
    let kind: String = row.try_get("kind")?;
    Ok(TokenRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        kind: TokenKind::parse(&kind)
            .ok_or_else(|| Error::Other(format!("Unknown token kind in database: {}", kind)))?,
        token_hash: row.try_get("token_hash")?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn save(
        &self,
        user_id: &str,
        kind: TokenKind,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<TokenRecord> {
        let record = TokenRecord::new(user_id, kind, token, expires_at);
        self.client
            .execute(
                "INSERT INTO tokens (id, user_id, kind, token_hash, expires_at, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &record.id,
                    &record.user_id,
                    &record.kind.as_str(),
                    &record.token_hash,
                    &record.expires_at,
                    &record.created_at,
                ],
            )
            .await?;
        Ok(record)
    }

    async fn find(&self, token: &str, kind: TokenKind) -> Result<Option<TokenRecord>> {
        let row = self
            .client
            .query_opt(
                "SELECT id, user_id, kind, token_hash, expires_at, created_at
                 FROM tokens
                 WHERE token_hash = $1 AND kind = $2 AND expires_at > $3
                 LIMIT 1",
                &[&hash_token(token), &kind.as_str(), &Utc::now()],
            )
            .await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn delete_by_user(&self, user_id: &str, kind: TokenKind) -> Result<u64> {
        Ok(self
            .client
            .execute(
                "DELETE FROM tokens WHERE user_id = $1 AND kind = $2",
                &[&user_id, &kind.as_str()],
            )
            .await?)
    }

    async fn delete_expired(&self) -> Result<u64> {
        Ok(self
            .client
            .execute("DELETE FROM tokens WHERE expires_at <= $1", &[&Utc::now()])
            .await?)
    }
}
