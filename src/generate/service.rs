//! Mock image generation

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use super::models::{
    CreateGeneration, Generation, GenerationStatus, MAX_PROMPT_LENGTH, MAX_STYLE_LENGTH,
};
use super::repository::GenerationRepository;
use crate::config::GenerateConfig;
use crate::error::{Error, Result};

/// Simulated latency and failure rate of the generation model
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub overload_rate: f64,
}

impl GenerationPolicy {
    /// No delay and never overloaded
    pub fn instant() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            overload_rate: 0.0,
        }
    }

    fn pick_delay(&self) -> Duration {
        let span = self.max_delay.saturating_sub(self.min_delay);
        self.min_delay + span.mul_f64(rand::random::<f64>())
    }

    fn is_overloaded(&self) -> bool {
        rand::random::<f64>() < self.overload_rate
    }
}

impl From<&GenerateConfig> for GenerationPolicy {
    fn from(config: &GenerateConfig) -> Self {
        Self {
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            overload_rate: config.overload_rate,
        }
    }
}

#[derive(Clone)]
pub struct GenerationService {
    generations: Arc<dyn GenerationRepository>,
    policy: GenerationPolicy,
}

impl GenerationService {
    pub fn new(generations: Arc<dyn GenerationRepository>, policy: GenerationPolicy) -> Self {
        Self {
            generations,
            policy,
        }
    }

    /// Run a (simulated) generation for `user_id` and store the result
    pub async fn create(&self, user_id: &str, payload: CreateGeneration) -> Result<Generation> {
        validate_create(&payload)?;

        tokio::time::sleep(self.policy.pick_delay()).await;

        if self.policy.is_overloaded() {
            tracing::warn!(user_id = %user_id, "Generation rejected: model overloaded");
            return Err(Error::ModelOverloaded);
        }

        let now = Utc::now();
        let generation = Generation {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            prompt: payload.prompt,
            style: payload.style,
            original_image: payload.image_upload,
            image_url: format!("https://picsum.photos/seed/{}/800/600", now.timestamp_millis()),
            status: GenerationStatus::Completed,
            created_at: now,
        };

        let generation = self.generations.insert(generation).await?;
        tracing::info!(user_id = %user_id, generation_id = %generation.id, "Generation completed");
        Ok(generation)
    }

    /// Latest generations of `user_id`
    pub async fn list(&self, user_id: &str, limit: i64) -> Result<Vec<Generation>> {
        self.generations.list_by_user(user_id, limit).await
    }
}

fn validate_create(payload: &CreateGeneration) -> Result<()> {
    let prompt_len = payload.prompt.chars().count();
    if prompt_len == 0 || prompt_len > MAX_PROMPT_LENGTH {
        return Err(Error::Validation(format!(
            "prompt must be between 1 and {} characters",
            MAX_PROMPT_LENGTH
        )));
    }
    if let Some(style) = &payload.style {
        if style.chars().count() > MAX_STYLE_LENGTH {
            return Err(Error::Validation(format!(
                "style must be at most {} characters",
                MAX_STYLE_LENGTH
            )));
        }
    }
    Ok(())
}
