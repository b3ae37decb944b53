//! Read side of the snapshot history plus the most recent live capture.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{LobbyFilter, LobbyView, Snapshot};
use crate::error::ServiceError;
use crate::persistence::SnapshotStore;

/// Serves snapshots to the presentation layer.
///
/// Persistence is throttled, so the scheduler also records every tick's
/// capture here; [`latest_snapshot`](Self::latest_snapshot) prefers that
/// live capture over the newest stored row.
#[derive(Debug, Clone)]
pub struct LobbyService {
    store: SnapshotStore,
    live: Arc<RwLock<Option<Snapshot>>>,
}

impl LobbyService {
    /// Creates a new `LobbyService`.
    #[must_use]
    pub fn new(store: SnapshotStore) -> Self {
        Self {
            store,
            live: Arc::new(RwLock::new(None)),
        }
    }

    /// Replaces the live capture.
    pub async fn record_live(&self, snapshot: Snapshot) {
        *self.live.write().await = Some(snapshot);
    }

    /// The newest capture: live if any tick has completed, else the newest
    /// stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn latest_snapshot(&self) -> Result<Option<Snapshot>, ServiceError> {
        if let Some(live) = self.live.read().await.as_ref() {
            return Ok(Some(live.clone()));
        }
        self.store.latest().await
    }

    /// Stored snapshots with `from <= timestamp <= to`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRequest`] when `from > to`, or a
    /// persistence error.
    pub async fn snapshots_in_range(&self, from: i64, to: i64) -> Result<Vec<Snapshot>, ServiceError> {
        if from > to {
            return Err(ServiceError::InvalidRequest(format!(
                "range start {from} is after end {to}"
            )));
        }
        self.store.query_range(from, to).await
    }

    /// Grouped lobby listing built from the latest capture.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] before the first capture, or a
    /// persistence error.
    pub async fn lobby_view(&self, filter: LobbyFilter) -> Result<LobbyView, ServiceError> {
        let snapshot = self
            .latest_snapshot()
            .await?
            .ok_or_else(|| ServiceError::NotFound("no snapshot captured yet".to_string()))?;
        Ok(LobbyView::build(&snapshot, filter))
    }
}
