//! Poll scheduler: drives fetch, persist, match and aggregate on a fixed
//! interval.
//!
//! One cooperative loop owns a [`SchedulerContext`] and awaits each tick
//! to completion before sleeping. Shutdown is observed only between ticks
//! and while sleeping, so a tick never stops halfway through a write.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use tokio::sync::watch;

use super::{Aggregator, LobbyService, MatchReport, ReminderMatcher};
use crate::domain::snapshot::reduce;
use crate::domain::{EventBus, PipelineEvent, Snapshot};
use crate::error::ServiceError;
use crate::notify::Notifier;
use crate::persistence::SnapshotStore;
use crate::source::LobbySource;

/// Timing and throttling knobs of the loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Sleep after a successful tick.
    pub poll_interval: Duration,
    /// Sleep after a failed tick.
    pub backoff: Duration,
    /// Persist the snapshot on every Nth tick.
    pub persist_every: u64,
    /// Run hourly aggregation on every Mth tick.
    pub aggregate_every: u64,
    /// Mod whose sessions are kept.
    pub mod_filter: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            backoff: Duration::from_secs(300),
            persist_every: 2,
            aggregate_every: 120,
            mod_filter: "ca".to_string(),
        }
    }
}

/// Summary of one completed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Zero-based tick index.
    pub tick: u64,
    /// Capture timestamp.
    pub timestamp: i64,
    /// Players across the kept sessions.
    pub total_players: u64,
    /// Kept sessions with at least one player.
    pub active_sessions: usize,
    /// Whether the snapshot was written to the store.
    pub persisted: bool,
    /// Matcher outcome.
    pub matches: MatchReport,
    /// Hourly buckets written by this tick.
    pub aggregated: usize,
}

/// Everything a tick needs, passed explicitly from tick to tick.
#[derive(Debug)]
pub struct SchedulerContext<N> {
    config: SchedulerConfig,
    tick: u64,
    snapshots: SnapshotStore,
    lobby: LobbyService,
    aggregator: Aggregator,
    matcher: ReminderMatcher<N>,
    event_bus: EventBus,
}

impl<N: Notifier> SchedulerContext<N> {
    /// Creates a context starting at tick 0.
    #[must_use]
    pub fn new(
        config: SchedulerConfig,
        snapshots: SnapshotStore,
        lobby: LobbyService,
        aggregator: Aggregator,
        matcher: ReminderMatcher<N>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            config,
            tick: 0,
            snapshots,
            lobby,
            aggregator,
            matcher,
            event_bus,
        }
    }

    /// Index the next tick will run with.
    #[must_use]
    pub const fn next_tick(&self) -> u64 {
        self.tick
    }

    /// Runs one tick: fetch, reduce, persist (throttled), match, aggregate
    /// (throttled), then publish [`PipelineEvent::TickCompleted`].
    ///
    /// A duplicate capture timestamp skips the write with a warning and the
    /// tick continues. Any other failure abandons the rest of the tick.
    ///
    /// # Errors
    ///
    /// Returns the error of the stage that abandoned the tick.
    pub async fn run_tick<S: LobbySource>(
        &mut self,
        source: &S,
        now: DateTime<Utc>,
    ) -> Result<TickReport, ServiceError> {
        let tick = self.tick;
        self.tick = self.tick.wrapping_add(1);

        let records = source.fetch().await?;
        let sessions = reduce(records, &self.config.mod_filter);
        let snapshot = Snapshot::new(now.timestamp(), sessions);

        let persisted = if tick % self.config.persist_every.max(1) == 0 {
            match self.snapshots.write(snapshot.timestamp, &snapshot.sessions).await {
                Ok(()) => true,
                Err(ServiceError::DuplicateTimestamp(ts)) => {
                    tracing::warn!(timestamp = ts, "duplicate capture timestamp; write dropped");
                    false
                }
                Err(e) => return Err(e),
            }
        } else {
            false
        };

        let matches = self.matcher.run(&snapshot.sessions, now).await?;

        let aggregated = if tick % self.config.aggregate_every.max(1) == 0 {
            self.aggregator.aggregate_hourly(now).await?.len()
        } else {
            0
        };

        let report = TickReport {
            tick,
            timestamp: snapshot.timestamp,
            total_players: snapshot.total_players(),
            active_sessions: snapshot.active_sessions(),
            persisted,
            matches,
            aggregated,
        };
        self.lobby.record_live(snapshot).await;

        let _ = self.event_bus.publish(PipelineEvent::TickCompleted {
            tick,
            timestamp: report.timestamp,
            total_players: report.total_players,
            active_sessions: report.active_sessions,
            persisted,
        });
        Ok(report)
    }

    /// Runs ticks until `shutdown` turns `true` or its sender is dropped.
    ///
    /// Failed and panicking ticks are logged and followed by the backoff
    /// sleep; nothing a tick does can end the loop.
    pub async fn run<S: LobbySource>(mut self, source: S, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            persist_every = self.config.persist_every,
            aggregate_every = self.config.aggregate_every,
            "poll scheduler started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let outcome = AssertUnwindSafe(self.run_tick(&source, Utc::now()))
                .catch_unwind()
                .await;
            let pause = match outcome {
                Ok(Ok(report)) => {
                    tracing::debug!(
                        tick = report.tick,
                        players = report.total_players,
                        sessions = report.active_sessions,
                        persisted = report.persisted,
                        notified = report.matches.notified,
                        "tick completed"
                    );
                    self.config.poll_interval
                }
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "tick abandoned; backing off");
                    self.config.backoff
                }
                Err(_) => {
                    tracing::error!("tick panicked; backing off");
                    self.config.backoff
                }
            };

            tokio::select! {
                () = tokio::time::sleep(pause) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!("poll scheduler stopped");
    }
}
