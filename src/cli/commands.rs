//! CLI command implementations

use anyhow::Result;
use std::path::Path;

use crate::api::{run_server, AppState};
use crate::auth::hash_password;
use crate::cli::{error, info, print_server_banner, success, warn};
use crate::config::{self, Config, CONFIG_FILENAME};
use crate::db;

/// Initialize a new genstudio.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    config::write_default_config(config_path)?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Set JWT_SECRET and DATABASE_URL, then run 'genstudio migrate' and 'genstudio serve'");

    Ok(())
}

/// Create the database schema
pub async fn migrate() -> Result<()> {
    let config = load_config()?;
    let client = db::connect(&config.database.url).await?;
    db::migrate(&client).await?;
    success("Database migrated");
    Ok(())
}

/// Start the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>, memory: bool) -> Result<()> {
    let config = load_config()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let state = if memory {
        warn("Using in-memory storage; all data is lost on exit");
        AppState::in_memory(&config)
    } else {
        AppState::postgres(&config).await
    };
    let state = match state {
        Ok(state) => state,
        Err(e) => {
            error(&format!("Failed to start: {}", e));
            return Err(e.into());
        }
    };

    print_server_banner(&host, port, if memory { "memory" } else { "postgres" });
    run_server(state, &host, port).await?;
    Ok(())
}

/// Print a bcrypt hash of `password`
pub async fn hash(password: &str) -> Result<()> {
    println!("{}", hash_password(password)?);
    Ok(())
}

fn load_config() -> Result<Config> {
    config::load_config().map_err(|e| {
        error(&e.to_string());
        e.into()
    })
}
