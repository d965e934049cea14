//! Database migration command.
//!
//! Runs the server migrations and then the `tower-sessions` store
//! migration, so a fresh database is ready for the first login.

use tower_sessions_sqlx_store::PostgresStore;

use super::CommandError;

/// Run all pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
