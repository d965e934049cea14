//! Database operations for the association `PostgreSQL` database.
//!
//! Each submodule wraps one area of the schema in a repository struct that
//! borrows the shared pool. Repositories build their queries at runtime so
//! list endpoints can apply whitelisted filters without a query per
//! combination.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p easyvol-cli -- migrate
//! ```

pub mod activity_log;
pub mod association;
pub mod events;
pub mod gdpr;
pub mod junior_members;
pub mod meetings;
pub mod members;
pub mod newsletters;
pub mod operations;
pub mod pagination;
pub mod print_templates;
pub mod scheduler;
pub mod users;
pub mod vehicles;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use activity_log::ActivityLogRepository;
pub use association::AssociationRepository;
pub use events::EventRepository;
pub use gdpr::GdprRepository;
pub use junior_members::JuniorMemberRepository;
pub use meetings::MeetingRepository;
pub use members::MemberRepository;
pub use newsletters::NewsletterRepository;
pub use operations::OperationsRepository;
pub use pagination::{Page, Pagination};
pub use print_templates::PrintTemplateRepository;
pub use scheduler::SchedulerRepository;
pub use users::UserRepository;
pub use vehicles::VehicleRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique fiscal code or username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Domain validation failed before the row was touched.
    #[error("{0}")]
    Validation(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
