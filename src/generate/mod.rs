//! Mock image generation resource

pub mod models;
pub mod repository;
pub mod service;

pub use models::{CreateGeneration, Generation, GenerationStatus, ListGenerationsQuery};
pub use repository::{GenerationRepository, MemoryGenerationRepository, PgGenerationRepository};
pub use service::{GenerationPolicy, GenerationService};
