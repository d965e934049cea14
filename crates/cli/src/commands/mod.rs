//! CLI command implementations.

pub mod migrate;
pub mod templates;
pub mod user;

use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Password hashing error.
    #[error("Password hashing error: {0}")]
    Hashing(String),

    /// Filesystem error while exporting templates.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Template document serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Named role does not exist.
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// Username is already taken.
    #[error("User already exists: {0}")]
    UserExists(String),
}

/// Connect to the application database using the same environment
/// variables as the server.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("EASYVOL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("EASYVOL_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(&database_url).await?)
}
