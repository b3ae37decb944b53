//! Reminder service: serialized mutations of reminder records.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::{
    AddOutcome, ClearOutcome, ReminderSet, RemoveOutcome, SubscriberGuard, SubscriberId,
    SubscriberLocks,
};
use crate::error::ServiceError;
use crate::persistence::ReminderStore;

/// Coordinates reminder CRUD with per-subscriber locking.
///
/// Every mutation of a subscriber's record (API add/clear/remove and
/// matcher consumption) runs while holding that subscriber's
/// [`SubscriberGuard`], so a consume can never interleave with a clear or
/// add of the same record.
#[derive(Debug, Clone)]
pub struct ReminderService {
    store: ReminderStore,
    locks: Arc<SubscriberLocks>,
}

impl ReminderService {
    /// Creates a new `ReminderService`.
    #[must_use]
    pub fn new(store: ReminderStore) -> Self {
        Self {
            store,
            locks: Arc::new(SubscriberLocks::new()),
        }
    }

    /// Tracks `name` for `subscriber_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRequest`] for a blank name, or a
    /// persistence error.
    pub async fn add(
        &self,
        subscriber_id: SubscriberId,
        name: &str,
    ) -> Result<AddOutcome, ServiceError> {
        let _guard = self.locks.acquire(subscriber_id).await;
        let outcome = self.store.add(subscriber_id, name).await?;
        tracing::info!(%subscriber_id, ?outcome, "reminder add");
        Ok(outcome)
    }

    /// Deletes the subscriber's record.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn clear(&self, subscriber_id: SubscriberId) -> Result<ClearOutcome, ServiceError> {
        let _guard = self.locks.acquire(subscriber_id).await;
        let outcome = self.store.clear(subscriber_id).await?;
        tracing::info!(%subscriber_id, ?outcome, "reminders cleared");
        Ok(outcome)
    }

    /// Stops tracking the given names.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn remove_names(
        &self,
        subscriber_id: SubscriberId,
        names: &BTreeSet<String>,
    ) -> Result<RemoveOutcome, ServiceError> {
        let guard = self.locks.acquire(subscriber_id).await;
        let removed = self.consume(&guard, names).await?;
        Ok(RemoveOutcome::from_count(removed))
    }

    /// Returns one subscriber's record.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn get(
        &self,
        subscriber_id: SubscriberId,
    ) -> Result<Option<ReminderSet>, ServiceError> {
        self.store.get(subscriber_id).await
    }

    /// Returns every record.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn list_all(&self) -> Result<Vec<ReminderSet>, ServiceError> {
        self.store.list_all().await
    }

    /// Takes exclusive access to a subscriber's record.
    pub async fn lock(&self, subscriber_id: SubscriberId) -> SubscriberGuard {
        self.locks.acquire(subscriber_id).await
    }

    /// Reads the record of the subscriber held by `guard`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn get_locked(
        &self,
        guard: &SubscriberGuard,
    ) -> Result<Option<ReminderSet>, ServiceError> {
        self.store.get(guard.subscriber_id()).await
    }

    /// Removes `names` from the record held by `guard`; returns how many
    /// were removed. The record disappears once its last name is gone.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn consume(
        &self,
        guard: &SubscriberGuard,
        names: &BTreeSet<String>,
    ) -> Result<u64, ServiceError> {
        let subscriber_id = guard.subscriber_id();
        let removed = self.store.remove_names(subscriber_id, names).await?;
        tracing::debug!(%subscriber_id, removed, "reminder names removed");
        Ok(removed)
    }
}
