//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! shopdesk migrate
//! ```
//!
//! Applies `crates/server/migrations/` and creates the session table used by
//! the server's cookie sessions.

use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use shopdesk_server::middleware::{SessionSetupError, session_store};

use super::{ConnectError, connect};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    SessionStore(#[from] SessionSetupError),
}

/// Run all migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running shop migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Creating session table...");
    let store: PostgresStore = session_store(&pool)?;
    store.migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
