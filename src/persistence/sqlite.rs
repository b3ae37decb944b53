//! SQLite connection pool setup and schema migrations.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::error::ServiceError;

/// Opens a connection pool for `database_url`, creating the file if needed.
///
/// # Errors
///
/// Returns [`ServiceError::PersistenceError`] if the URL is invalid or the
/// database cannot be opened.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, ServiceError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(ServiceError::persistence)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await
        .map_err(ServiceError::persistence)?;

    tracing::info!(database_url, "database connected");
    Ok(pool)
}

/// Applies the embedded migrations.
///
/// # Errors
///
/// Returns [`ServiceError::PersistenceError`] if a migration fails.
pub async fn migrate(pool: &SqlitePool) -> Result<(), ServiceError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(ServiceError::persistence)?;
    tracing::debug!("migrations applied");
    Ok(())
}

/// Opens a migrated, single-connection in-memory database.
///
/// The pool never recycles its connection, so the database lives as long
/// as the pool.
///
/// # Errors
///
/// Returns [`ServiceError::PersistenceError`] on failure.
pub async fn connect_in_memory() -> Result<SqlitePool, ServiceError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(ServiceError::persistence)?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(ServiceError::persistence)?;
    migrate(&pool).await?;
    Ok(pool)
}
