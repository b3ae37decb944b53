//! Time buckets used for averaging player counts.
//!
//! All timestamps are integer seconds since the Unix epoch, UTC.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

/// Width of an hour bucket in seconds.
pub const HOUR_SECS: i64 = 3_600;

/// Width of a day bucket in seconds.
pub const DAY_SECS: i64 = 86_400;

/// Truncates `timestamp` to the start of its hour.
#[must_use]
pub const fn hour_floor(timestamp: i64) -> i64 {
    timestamp.saturating_sub(timestamp.rem_euclid(HOUR_SECS))
}

/// A closed `[start, end]` interval of timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    /// First second in the window.
    pub start: i64,
    /// Last second in the window (inclusive).
    pub end: i64,
}

impl TimeWindow {
    /// The hour beginning at `hour_start`: `[hour_start, hour_start + 3599]`.
    ///
    /// The end saturates at `i64::MAX`; use [`Self::aligned_hour`] for
    /// untrusted input.
    #[must_use]
    pub const fn hour(hour_start: i64) -> Self {
        Self {
            start: hour_start,
            end: hour_start.saturating_add(HOUR_SECS - 1),
        }
    }

    /// The hour beginning at `hour_start`, or `None` if `hour_start` is not
    /// on an hour boundary or the hour does not fit in an `i64`.
    #[must_use]
    pub const fn aligned_hour(hour_start: i64) -> Option<Self> {
        if hour_start.rem_euclid(HOUR_SECS) != 0 {
            return None;
        }
        match hour_start.checked_add(HOUR_SECS - 1) {
            Some(end) => Some(Self {
                start: hour_start,
                end,
            }),
            None => None,
        }
    }

    /// The UTC day `day`: `[00:00:00, 23:59:59]`.
    #[must_use]
    pub fn day(day: NaiveDate) -> Self {
        let start = Utc
            .from_utc_datetime(&day.and_time(NaiveTime::default()))
            .timestamp();
        Self {
            start,
            end: start + DAY_SECS - 1,
        }
    }
}

/// Average player count over a bucket.
///
/// `NoData` means no snapshot fell inside the bucket. It is never the same
/// thing as an average of zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BucketAverage {
    /// No snapshots in the bucket.
    NoData,
    /// Mean of per-snapshot player totals.
    Players(f64),
}

impl BucketAverage {
    /// Averages per-snapshot totals; empty input yields [`Self::NoData`].
    #[must_use]
    pub fn from_totals(totals: &[u64]) -> Self {
        if totals.is_empty() {
            return Self::NoData;
        }
        let sum: u64 = totals.iter().sum();
        Self::Players(sum as f64 / totals.len() as f64)
    }

    /// The average, or `None` for [`Self::NoData`].
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::NoData => None,
            Self::Players(v) => Some(v),
        }
    }
}

/// Where the next hourly aggregation pass starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationCursor {
    /// No hourly bucket has been written yet.
    Empty,
    /// Resume after the bucket starting at this timestamp.
    ResumeAfter(i64),
}

impl AggregationCursor {
    /// Builds a cursor from the latest stored bucket, if any.
    #[must_use]
    pub const fn from_latest(latest_bucket: Option<i64>) -> Self {
        match latest_bucket {
            Some(ts) => Self::ResumeAfter(ts),
            None => Self::Empty,
        }
    }

    /// First bucket to examine.
    ///
    /// For [`Self::Empty`] this is the hour holding the earliest snapshot;
    /// `None` when there are no snapshots at all.
    #[must_use]
    pub fn first_bucket(self, earliest_snapshot: Option<i64>) -> Option<i64> {
        match self {
            Self::Empty => earliest_snapshot.map(hour_floor),
            Self::ResumeAfter(ts) => Some(hour_floor(ts) + HOUR_SECS),
        }
    }
}

/// Hour buckets from `first` up to, but excluding, the hour holding `now`.
pub fn elapsed_hours(first: i64, now: i64) -> impl Iterator<Item = i64> {
    let current = hour_floor(now);
    let mut next = hour_floor(first);
    std::iter::from_fn(move || {
        if next >= current {
            return None;
        }
        let bucket = next;
        next += HOUR_SECS;
        Some(bucket)
    })
}
