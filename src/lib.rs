//! Genstudio - image generation studio API
//!
//! Library interface: user accounts, token based sessions, the mock
//! generation resource and the axum router serving them.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod generate;
pub mod users;

pub use config::Config;
pub use error::{Error, Result};
