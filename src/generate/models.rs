//! Generation models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_PROMPT_LENGTH: usize = 1000;
pub const MAX_STYLE_LENGTH: usize = 100;
pub const DEFAULT_LIST_LIMIT: i64 = 5;
pub const MAX_LIST_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Completed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(GenerationStatus::Completed),
            _ => None,
        }
    }
}

/// A stored generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub style: Option<String>,
    pub original_image: Option<String>,
    pub image_url: String,
    pub status: GenerationStatus,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /v1/generate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGeneration {
    pub prompt: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub image_upload: Option<String>,
}

/// Query of `GET /v1/generate`
#[derive(Debug, Default, Deserialize)]
pub struct ListGenerationsQuery {
    #[serde(default)]
    pub limit: Option<String>,
}

impl ListGenerationsQuery {
    /// Requested limit; anything unparsable falls back to the default
    pub fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .min(MAX_LIST_LIMIT)
    }
}
