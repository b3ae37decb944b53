//! Player-count statistics DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use super::common_dto::ListMeta;
use crate::domain::{BucketAverage, TimeWindow};
use crate::persistence::HourlyAverage;

/// Average over one hour or day window.
///
/// `average_player_count` is `null` when the window holds no snapshots,
/// which is distinct from an average of zero.
#[derive(Debug, Serialize, ToSchema)]
pub struct WindowAverageResponse {
    /// Inclusive window start, seconds since the epoch.
    pub window_start: i64,
    /// Inclusive window end.
    pub window_end: i64,
    /// Whether any snapshot fell inside the window.
    pub has_data: bool,
    /// Mean of per-snapshot player totals.
    pub average_player_count: Option<f64>,
}

impl WindowAverageResponse {
    /// Pairs a window with its computed average.
    #[must_use]
    pub fn new(window: TimeWindow, average: BucketAverage) -> Self {
        Self {
            window_start: window.start,
            window_end: window.end,
            has_data: average.value().is_some(),
            average_player_count: average.value(),
        }
    }
}

/// One stored hourly average.
#[derive(Debug, Serialize, ToSchema)]
pub struct HourlyAverageDto {
    /// Hour bucket start.
    pub hour_start: i64,
    /// Average player count.
    pub average_player_count: f64,
}

impl From<HourlyAverage> for HourlyAverageDto {
    fn from(row: HourlyAverage) -> Self {
        Self {
            hour_start: row.hour_start,
            average_player_count: row.average_player_count,
        }
    }
}

/// Response body for `GET /stats/hourly`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HourlyAverageListResponse {
    /// Buckets in ascending order.
    pub data: Vec<HourlyAverageDto>,
    /// List metadata.
    pub meta: ListMeta,
}
