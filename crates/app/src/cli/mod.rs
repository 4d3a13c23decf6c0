//! Command line for the `readrise` binary.
//!
//! - `serve` - run the HTTP API
//! - `seed` - write the starter catalog
//! - `levels` - print the catalog
//! - `leaderboard` - print the top players
//! - `token` - mint a session token for local testing

mod commands;

use clap::{Parser, Subcommand};
use readrise_core::model::ParseIdError;
use services::{AppServicesError, AuthError, ContentServiceError, DEFAULT_LEADERBOARD_LIMIT};
use storage::repository::StorageError;
use thiserror::Error;

pub use commands::*;

/// Default database when neither `--db` nor `READRISE_DB_URL` is given.
pub const DEFAULT_DB_URL: &str = "sqlite://readrise.sqlite3";

/// Read n Rise: levelled reading comprehension with points and progression.
#[derive(Parser, Debug)]
#[command(name = "readrise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQLite database URL or file path
    #[arg(long, global = true, env = "READRISE_DB_URL", default_value = DEFAULT_DB_URL)]
    pub db: String,

    /// HS256 secret for session tokens; without it every caller is anonymous
    #[arg(long, global = true, env = "READRISE_TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },

    /// Write the starter catalog
    Seed {
        /// Overwrite an existing catalog
        #[arg(long)]
        force: bool,
    },

    /// Print the catalog
    Levels,

    /// Print the top players by total points
    Leaderboard {
        /// Number of rows
        #[arg(short, long, default_value_t = DEFAULT_LEADERBOARD_LIMIT)]
        limit: usize,
    },

    /// Mint a session token for a user
    Token {
        /// User id to put in the `sub` claim
        user_id: String,

        /// Seconds until the token expires; no expiry when omitted
        #[arg(long)]
        ttl_secs: Option<i64>,
    },
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    #[error(transparent)]
    Services(#[from] AppServicesError),
    #[error(transparent)]
    Content(#[from] ContentServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    UserId(#[from] ParseIdError),
    #[error("a token secret is required (--token-secret or READRISE_TOKEN_SECRET)")]
    MissingSecret,
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the parsed command.
///
/// # Errors
///
/// Returns `CliError` if storage cannot be opened or the command fails.
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let db_url = normalize_sqlite_url(&cli.db);
    let secret = cli.token_secret.as_deref();
    match cli.command {
        Commands::Serve { host, port } => serve(&db_url, secret, &host, port).await,
        Commands::Seed { force } => seed(&db_url, force).await,
        Commands::Levels => levels(&db_url).await,
        Commands::Leaderboard { limit } => leaderboard(&db_url, limit).await,
        Commands::Token { user_id, ttl_secs } => token(secret, &user_id, ttl_secs),
    }
}

/// Turn a bare file path into an absolute `sqlite://` URL; URLs and
/// in-memory URLs pass through.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("sqlite://")
        || trimmed.starts_with("sqlite::memory:")
        || trimmed.starts_with("sqlite:file:")
    {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}
