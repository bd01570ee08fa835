//! CLI interface for Genstudio

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "genstudio")]
#[command(author = "Krakaw")]
#[command(version = "1.0.0")]
#[command(about = "Image generation studio API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default genstudio.toml in the current directory
    Init,

    /// Create database tables
    Migrate,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Keep users, tokens and generations in memory instead of PostgreSQL
        #[arg(long)]
        memory: bool,
    },

    /// Print a password hash suitable for seeding the users table
    HashPassword {
        /// Plaintext password
        #[arg(env = "GENSTUDIO_PASSWORD")]
        password: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["genstudio", "serve", "--port", "8080", "--memory"]).unwrap();
        match cli.command {
            Commands::Serve { host, port, memory } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(8080));
                assert!(memory);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_hash_password() {
        let cli = Cli::try_parse_from(["genstudio", "hash-password", "Password123!"]).unwrap();
        assert!(matches!(cli.command, Commands::HashPassword { password } if password == "Password123!"));
    }
}
