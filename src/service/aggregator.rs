//! Hour and day player-count averages over the snapshot history.
//!
//! The snapshot store stays the source of truth. The hourly-average table
//! is a derived cache that [`Aggregator::aggregate_hourly`] extends one
//! fully-elapsed hour at a time.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::bucket::elapsed_hours;
use crate::domain::{AggregationCursor, BucketAverage, EventBus, PipelineEvent, TimeWindow};
use crate::error::ServiceError;
use crate::persistence::{HourlyAverage, HourlyAverageStore, SnapshotStore};

/// Computes averages and maintains the hourly-average table.
#[derive(Debug, Clone)]
pub struct Aggregator {
    snapshots: SnapshotStore,
    hourly: HourlyAverageStore,
    event_bus: EventBus,
}

impl Aggregator {
    /// Creates a new `Aggregator`.
    #[must_use]
    pub fn new(snapshots: SnapshotStore, hourly: HourlyAverageStore, event_bus: EventBus) -> Self {
        Self {
            snapshots,
            hourly,
            event_bus,
        }
    }

    /// Average of per-snapshot player totals over `window`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn average_over_window(
        &self,
        window: TimeWindow,
    ) -> Result<BucketAverage, ServiceError> {
        let snapshots = self.snapshots.query_range(window.start, window.end).await?;
        let totals: Vec<u64> = snapshots.iter().map(|s| s.total_players()).collect();
        Ok(BucketAverage::from_totals(&totals))
    }

    /// Average over `[hour_start, hour_start + 3599]`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn average_over_hour(&self, hour_start: i64) -> Result<BucketAverage, ServiceError> {
        self.average_over_window(TimeWindow::hour(hour_start)).await
    }

    /// Average over the UTC day `day`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn average_over_day(&self, day: NaiveDate) -> Result<BucketAverage, ServiceError> {
        self.average_over_window(TimeWindow::day(day)).await
    }

    /// Where the next aggregation pass resumes.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn cursor(&self) -> Result<AggregationCursor, ServiceError> {
        Ok(AggregationCursor::from_latest(
            self.hourly.latest_bucket().await?,
        ))
    }

    /// Writes hourly averages for every fully-elapsed hour after the cursor.
    ///
    /// Hours without snapshots are skipped and never written. The hour
    /// containing `now` is never computed. Returns the rows written by this
    /// pass; a second pass with no new data returns nothing.
    ///
    /// # Errors
    ///
    /// Returns a persistence error. Buckets written before the failure stay
    /// written, and the next pass resumes after them.
    pub async fn aggregate_hourly(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<HourlyAverage>, ServiceError> {
        let cursor = self.cursor().await?;
        let earliest = match cursor {
            AggregationCursor::Empty => self.snapshots.earliest_timestamp().await?,
            AggregationCursor::ResumeAfter(_) => None,
        };
        let Some(first) = cursor.first_bucket(earliest) else {
            tracing::debug!("no snapshots to aggregate");
            return Ok(Vec::new());
        };

        let mut written = Vec::new();
        for hour_start in elapsed_hours(first, now.timestamp()) {
            let BucketAverage::Players(average_player_count) =
                self.average_over_hour(hour_start).await?
            else {
                tracing::debug!(hour_start, "hour has no snapshots; skipped");
                continue;
            };

            let row = HourlyAverage {
                hour_start,
                average_player_count,
            };
            if self.hourly.insert(row).await? {
                let _ = self.event_bus.publish(PipelineEvent::HourlyAverageWritten {
                    hour_start,
                    average_player_count,
                });
                written.push(row);
            }
        }

        if !written.is_empty() {
            tracing::info!(buckets = written.len(), "hourly averages written");
        }
        Ok(written)
    }

    /// Stored hourly averages with `from <= hour_start <= to`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn hourly_range(
        &self,
        from: i64,
        to: i64,
    ) -> Result<Vec<HourlyAverage>, ServiceError> {
        self.hourly.range(from, to).await
    }
}
