//! Generation storage

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::{Client, Row};

use super::models::{Generation, GenerationStatus};
use crate::error::{Error, Result};

#[async_trait]
pub trait GenerationRepository: Send + Sync {
    async fn insert(&self, generation: Generation) -> Result<Generation>;

    /// Newest first, at most `limit`
    async fn list_by_user(&self, user_id: &str, limit: i64) -> Result<Vec<Generation>>;
}

/// In-memory generation repository
#[derive(Clone, Default)]
pub struct MemoryGenerationRepository {
    generations: Arc<RwLock<Vec<Generation>>>,
}

impl MemoryGenerationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GenerationRepository for MemoryGenerationRepository {
    async fn insert(&self, generation: Generation) -> Result<Generation> {
        self.generations.write().await.push(generation.clone());
        Ok(generation)
    }

    async fn list_by_user(&self, user_id: &str, limit: i64) -> Result<Vec<Generation>> {
        let mut mine: Vec<Generation> = self
            .generations
            .read()
            .await
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        mine.truncate(limit.max(0) as usize);
        Ok(mine)
    }
}

/// PostgreSQL generation repository over the `generations` table
#[derive(Clone)]
pub struct PgGenerationRepository {
    client: Arc<Client>,
}

impl PgGenerationRepository {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

fn generation_from_row(row: &Row) -> Result<Generation> {
    let status: String = row.try_get("status")?;
    Ok(Generation {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        prompt: row.try_get("prompt")?,
        style: row.try_get("style")?,
        original_image: row.try_get("original_image")?,
        image_url: row.try_get("image_url")?,
        status: GenerationStatus::parse(&status)
            .ok_or_else(|| Error::Other(format!("Unknown generation status: {}", status)))?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl GenerationRepository for PgGenerationRepository {
    async fn insert(&self, generation: Generation) -> Result<Generation> {
        self.client
            .execute(
                "INSERT INTO generations
                 (id, user_id, prompt, style, original_image, image_url, status, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &generation.id,
                    &generation.user_id,
                    &generation.prompt,
                    &generation.style,
                    &generation.original_image,
                    &generation.image_url,
                    &generation.status.as_str(),
                    &generation.created_at,
                ],
            )
            .await?;
        Ok(generation)
    }

    async fn list_by_user(&self, user_id: &str, limit: i64) -> Result<Vec<Generation>> {
        let rows = self
            .client
            .query(
                "SELECT id, user_id, prompt, style, original_image, image_url, status, created_at
                 FROM generations
                 WHERE user_id = $1
                 ORDER BY created_at DESC
                 LIMIT $2",
                &[&user_id, &limit],
            )
            .await?;
        rows.iter().map(generation_from_row).collect()
    }
}
