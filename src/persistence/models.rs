//! Database row models.

use serde::{Deserialize, Serialize};

/// A row of the `hourly_averages` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyAverage {
    /// Start of the hour bucket, seconds since the epoch.
    pub hour_start: i64,
    /// Mean of per-snapshot player totals inside the hour.
    pub average_player_count: f64,
}

/// A raw row of the `snapshots` table before JSON decoding.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SnapshotRow {
    pub captured_at: i64,
    pub sessions_json: String,
}

/// A raw row of the `reminders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ReminderRow {
    pub subscriber_id: i64,
    pub name: String,
}
