//! Per-subscriber exclusive locks for reminder mutations.
//!
//! Reminder records are mutated from two places: API calls (add, clear,
//! remove) and the matcher (consume after delivery). [`SubscriberLocks`]
//! hands out one async mutex per subscriber so that mutations of the same
//! record never interleave, while different subscribers proceed
//! concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::SubscriberId;

type LockMap = SyncMutex<HashMap<SubscriberId, Arc<Mutex<()>>>>;

/// Exclusive access to one subscriber's reminder record.
///
/// Released on drop. The subscriber's entry is removed from the registry
/// once nobody holds or waits for it.
#[derive(Debug)]
pub struct SubscriberGuard {
    subscriber_id: SubscriberId,
    guard: Option<OwnedMutexGuard<()>>,
    registry: Arc<LockMap>,
}

impl SubscriberGuard {
    /// The subscriber this guard locks.
    #[must_use]
    pub const fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        prune(&self.registry);
    }
}

/// Drops entries referenced only by the map.
///
/// Every clone of an entry is taken while the map is locked, so an entry
/// with a single reference has no holder and no waiter. Entries left over
/// by cancelled acquisitions are swept here too.
fn prune(registry: &LockMap) {
    let mut map = registry.lock().unwrap_or_else(PoisonError::into_inner);
    map.retain(|_, lock| Arc::strong_count(lock) > 1);
}

/// Registry of per-subscriber mutexes.
///
/// The outer map is a short-held synchronous mutex that is never locked
/// across an await; each entry is an `Arc<tokio::sync::Mutex<()>>`.
/// Entries live only while a guard holds or awaits them, so the map stays
/// proportional to in-flight mutations rather than to every id ever seen.
#[derive(Debug, Default)]
pub struct SubscriberLocks {
    locks: Arc<LockMap>,
}

impl SubscriberLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `subscriber_id`'s record.
    pub async fn acquire(&self, subscriber_id: SubscriberId) -> SubscriberGuard {
        let lock = {
            let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(subscriber_id).or_default())
        };
        SubscriberGuard {
            subscriber_id,
            guard: Some(lock.lock_owned().await),
            registry: Arc::clone(&self.locks),
        }
    }

    /// Number of subscribers currently locked or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no subscriber is locked or awaited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
