//! PostgreSQL connection and schema

use std::sync::Arc;
use tokio_postgres::{Client, NoTls};

use crate::error::Result;

/// Schema for users, refresh tokens and generations
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,
    role        TEXT NOT NULL DEFAULT 'user',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS tokens (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    kind        TEXT NOT NULL,
    token_hash  TEXT NOT NULL,
    expires_at  TIMESTAMPTZ NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS tokens_token_hash_idx ON tokens (token_hash);
CREATE INDEX IF NOT EXISTS tokens_user_kind_idx ON tokens (user_id, kind);

CREATE TABLE IF NOT EXISTS generations (
    id              TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    prompt          TEXT NOT NULL,
    style           TEXT,
    original_image  TEXT,
    image_url       TEXT NOT NULL,
    status          TEXT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS generations_user_created_idx ON generations (user_id, created_at DESC);
"#;

/// Connect to PostgreSQL and drive the connection in the background
pub async fn connect(url: &str) -> Result<Arc<Client>> {
    let (client, connection) = tokio_postgres::connect(url, NoTls).await?;

    // Spawn the connection handler
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    tracing::debug!("Connected to PostgreSQL");
    Ok(Arc::new(client))
}

/// Create tables and indexes if they do not exist
pub async fn migrate(client: &Client) -> Result<()> {
    client.batch_execute(SCHEMA).await?;
    tracing::info!("Database schema is up to date");
    Ok(())
}
