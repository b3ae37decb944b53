//! Reminder records and the outcomes of reminder mutations.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::SubscriberId;

/// Normalizes a player name for storage and comparison.
///
/// Trims surrounding whitespace and lowercases. Returns `None` when
/// nothing is left.
#[must_use]
pub fn normalize_name(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// The set of names one subscriber wants to be notified about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderSet {
    /// Owner of the record.
    pub subscriber_id: SubscriberId,
    /// Normalized tracked names.
    pub tracked_names: BTreeSet<String>,
}

impl ReminderSet {
    /// Creates an empty set for `subscriber_id`.
    #[must_use]
    pub fn new(subscriber_id: SubscriberId) -> Self {
        Self {
            subscriber_id,
            tracked_names: BTreeSet::new(),
        }
    }

    /// Tracked names that are present in `active`.
    #[must_use]
    pub fn matching(&self, active: &HashSet<String>) -> BTreeSet<String> {
        self.tracked_names
            .iter()
            .filter(|name| active.contains(*name))
            .cloned()
            .collect()
    }
}

/// A subscriber whose tracked names are currently active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderMatch {
    /// Subscriber to notify.
    pub subscriber_id: SubscriberId,
    /// Matched names, sorted.
    pub names: BTreeSet<String>,
}

/// Payload handed to a [`crate::notify::Notifier`].
///
/// Carries data only; turning it into a human-readable message is the
/// presentation layer's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderNotification {
    /// Delivery target.
    pub subscriber_id: SubscriberId,
    /// Names that came online.
    pub names: Vec<String>,
    /// When the match was detected.
    pub matched_at: DateTime<Utc>,
}

impl ReminderNotification {
    /// Builds a notification for a match detected at `matched_at`.
    #[must_use]
    pub fn new(
        subscriber_id: SubscriberId,
        names: &BTreeSet<String>,
        matched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subscriber_id,
            names: names.iter().cloned().collect(),
            matched_at,
        }
    }
}

/// Result of adding a tracked name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    /// The name was inserted.
    Added,
    /// The subscriber already tracks this name; nothing changed.
    AlreadyTracked,
}

/// Result of clearing a subscriber's reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearOutcome {
    /// The record existed and was deleted.
    Cleared,
    /// There was nothing to delete.
    NoSuchSubscriber,
}

/// Result of removing names from a subscriber's set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    /// At least one name was removed.
    Removed {
        /// Number of names removed.
        count: u64,
    },
    /// None of the names were tracked, or the subscriber has no record.
    NotTracked,
}

impl RemoveOutcome {
    /// Maps a deleted-row count to an outcome.
    #[must_use]
    pub const fn from_count(count: u64) -> Self {
        if count == 0 {
            Self::NotTracked
        } else {
            Self::Removed { count }
        }
    }
}
