//! Append-only table of hourly player-count averages.

use sqlx::SqlitePool;

use super::models::HourlyAverage;
use crate::error::ServiceError;

/// SQLite-backed store of derived hourly averages.
///
/// A bucket is written at most once. Re-inserting an existing bucket is a
/// no-op, never an overwrite.
#[derive(Debug, Clone)]
pub struct HourlyAverageStore {
    pool: SqlitePool,
}

impl HourlyAverageStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start of the most recent stored bucket.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn latest_bucket(&self) -> Result<Option<i64>, ServiceError> {
        sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(hour_start) FROM hourly_averages")
            .fetch_one(&self.pool)
            .await
            .map_err(ServiceError::persistence)
    }

    /// Inserts a bucket. Returns `false` if it already existed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRequest`] for a negative or non-finite
    /// average, or [`ServiceError::PersistenceError`] on database failure.
    pub async fn insert(&self, row: HourlyAverage) -> Result<bool, ServiceError> {
        if !row.average_player_count.is_finite() || row.average_player_count < 0.0 {
            return Err(ServiceError::InvalidRequest(format!(
                "invalid hourly average {} for bucket {}",
                row.average_player_count, row.hour_start
            )));
        }

        let result = sqlx::query(
            "INSERT INTO hourly_averages (hour_start, average_players) VALUES (?1, ?2) \
             ON CONFLICT (hour_start) DO NOTHING",
        )
        .bind(row.hour_start)
        .bind(row.average_player_count)
        .execute(&self.pool)
        .await
        .map_err(ServiceError::persistence)?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns buckets with `from <= hour_start <= to`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn range(&self, from: i64, to: i64) -> Result<Vec<HourlyAverage>, ServiceError> {
        let rows = sqlx::query_as::<_, (i64, f64)>(
            "SELECT hour_start, average_players FROM hourly_averages \
             WHERE hour_start BETWEEN ?1 AND ?2 ORDER BY hour_start ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(ServiceError::persistence)?;

        Ok(rows
            .into_iter()
            .map(|(hour_start, average_player_count)| HourlyAverage {
                hour_start,
                average_player_count,
            })
            .collect())
    }

    /// Returns the number of stored buckets.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn count(&self) -> Result<i64, ServiceError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM hourly_averages")
            .fetch_one(&self.pool)
            .await
            .map_err(ServiceError::persistence)
    }
}
