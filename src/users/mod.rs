//! User accounts

pub mod models;
pub mod repository;
pub mod service;

pub use models::{NewUser, PublicUser, User, UserRole};
pub use repository::{MemoryUserRepository, PgUserRepository, UserRepository};
pub use service::UserService;
