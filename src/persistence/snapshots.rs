//! Append-only store of lobby snapshots keyed by capture timestamp.

use sqlx::SqlitePool;

use super::models::SnapshotRow;
use crate::domain::{Snapshot, StoredSession};
use crate::error::ServiceError;

/// SQLite-backed snapshot store.
///
/// The capture timestamp is the primary key: a second write at the same
/// timestamp is rejected, never merged or overwritten.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    pool: SqlitePool,
}

impl SnapshotStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Appends a snapshot captured at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::DuplicateTimestamp`] if a snapshot already
    /// exists at `timestamp`, or [`ServiceError::PersistenceError`] on
    /// database failure.
    pub async fn write(
        &self,
        timestamp: i64,
        sessions: &[StoredSession],
    ) -> Result<(), ServiceError> {
        let sessions_json =
            serde_json::to_string(sessions).map_err(|e| ServiceError::Internal(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO snapshots (captured_at, sessions_json) VALUES (?1, ?2) \
             ON CONFLICT (captured_at) DO NOTHING",
        )
        .bind(timestamp)
        .bind(sessions_json)
        .execute(&self.pool)
        .await
        .map_err(ServiceError::persistence)?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::DuplicateTimestamp(timestamp));
        }
        Ok(())
    }

    /// Returns snapshots with `start <= timestamp <= end`, oldest first.
    ///
    /// An inverted or empty range yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure or if
    /// a stored row cannot be decoded.
    pub async fn query_range(&self, start: i64, end: i64) -> Result<Vec<Snapshot>, ServiceError> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            "SELECT captured_at, sessions_json FROM snapshots \
             WHERE captured_at BETWEEN ?1 AND ?2 ORDER BY captured_at ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(ServiceError::persistence)?;

        rows.into_iter().map(decode).collect()
    }

    /// Returns the most recent snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn latest(&self) -> Result<Option<Snapshot>, ServiceError> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            "SELECT captured_at, sessions_json FROM snapshots ORDER BY captured_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(ServiceError::persistence)?;

        row.map(decode).transpose()
    }

    /// Returns the timestamp of the oldest snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn earliest_timestamp(&self) -> Result<Option<i64>, ServiceError> {
        sqlx::query_scalar::<_, Option<i64>>("SELECT MIN(captured_at) FROM snapshots")
            .fetch_one(&self.pool)
            .await
            .map_err(ServiceError::persistence)
    }

    /// Returns the number of stored snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn count(&self) -> Result<i64, ServiceError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM snapshots")
            .fetch_one(&self.pool)
            .await
            .map_err(ServiceError::persistence)
    }
}

fn decode(row: SnapshotRow) -> Result<Snapshot, ServiceError> {
    let sessions: Vec<StoredSession> = serde_json::from_str(&row.sessions_json).map_err(|e| {
        ServiceError::PersistenceError(format!(
            "corrupt snapshot at {}: {e}",
            row.captured_at
        ))
    })?;
    Ok(Snapshot::new(row.captured_at, sessions))
}
