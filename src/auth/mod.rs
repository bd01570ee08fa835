//! Authentication and session management

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod session;
pub mod store;

pub use jwt::{Claims, SignedToken, TokenCodec, TokenError, TokenKind};
pub use middleware::{bearer_token, require_auth};
pub use models::{AuthTokens, AuthUser, LoginRequest, LoginResponse, LogoutRequest, LogoutResponse, TokenInfo};
pub use password::{hash_password, verify_password, MAX_PASSWORD_BYTES};
pub use session::SessionService;
pub use store::{MemoryTokenStore, PgTokenStore, TokenRecord, TokenStore};
