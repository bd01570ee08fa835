//! Configuration management for Genstudio

pub mod loader;
mod schema;

pub use loader::{load_config, load_config_from_path, write_default_config, CONFIG_FILENAME};
pub use schema::*;
