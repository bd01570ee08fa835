//! HTTP API server

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, MemoryTokenStore, PgTokenStore, SessionService, TokenCodec, TokenStore};
use crate::config::Config;
use crate::db;
use crate::error::Result;
use crate::generate::{
    GenerationPolicy, GenerationRepository, GenerationService, MemoryGenerationRepository,
    PgGenerationRepository,
};
use crate::users::{MemoryUserRepository, PgUserRepository, UserRepository, UserService};

use super::routes;

/// How often expired refresh tokens are physically removed
const TOKEN_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionService,
    pub users: UserService,
    pub generations: GenerationService,
}

impl AppState {
    /// Wire services over the given storage
    pub fn new(
        config: &Config,
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenStore>,
        generations: Arc<dyn GenerationRepository>,
    ) -> Result<Self> {
        config.validate()?;
        let codec = Arc::new(TokenCodec::new(&config.auth)?);

        Ok(Self {
            sessions: SessionService::new(users.clone(), tokens, codec)?,
            users: UserService::new(users),
            generations: GenerationService::new(
                generations,
                GenerationPolicy::from(&config.generate),
            ),
        })
    }

    /// State backed by process memory; nothing survives a restart
    pub fn in_memory(config: &Config) -> Result<Self> {
        Self::new(
            config,
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryTokenStore::new()),
            Arc::new(MemoryGenerationRepository::new()),
        )
    }

    /// State backed by PostgreSQL at `config.database.url`
    pub async fn postgres(config: &Config) -> Result<Self> {
        let client = db::connect(&config.database.url).await?;
        Self::new(
            config,
            Arc::new(PgUserRepository::new(client.clone())),
            Arc::new(PgTokenStore::new(client.clone())),
            Arc::new(PgGenerationRepository::new(client)),
        )
    }
}

/// Run the HTTP API server
pub async fn run_server(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    serve(listener, state).await
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    spawn_token_sweeper(state.sessions.clone());

    let app = create_router(state);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drop expired refresh token records.
///
/// Only housekeeping: lookups already ignore expired records.
fn spawn_token_sweeper(sessions: SessionService) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TOKEN_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match sessions.purge_expired_tokens().await {
                Ok(0) => {}
                Ok(n) => tracing::debug!("Removed {} expired tokens", n),
                Err(e) => tracing::warn!("Token sweep failed: {}", e),
            }
        }
    });
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/v1/generate",
            post(routes::create_generation).get(routes::list_generations),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(routes::health))
        // Auth routes
        .route("/v1/auth/register", post(routes::register))
        .route("/v1/auth/login", post(routes::login))
        .route("/v1/auth/logout", post(routes::logout))
        .merge(protected)
        .fallback(routes::not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
