//! Reminder DTOs for subscriber self-service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AddOutcome, ClearOutcome, ReminderSet, RemoveOutcome};

/// A subscriber's tracked names.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReminderSetDto {
    /// Subscriber identity.
    pub subscriber_id: i64,
    /// Normalized names, sorted.
    pub tracked_names: Vec<String>,
}

impl From<ReminderSet> for ReminderSetDto {
    fn from(set: ReminderSet) -> Self {
        Self {
            subscriber_id: set.subscriber_id.get(),
            tracked_names: set.tracked_names.into_iter().collect(),
        }
    }
}

/// Response body for `GET /reminders`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReminderListResponse {
    /// Every record, by subscriber.
    pub data: Vec<ReminderSetDto>,
}

/// Request body for `POST /reminders/{subscriber_id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddReminderRequest {
    /// Player name to track; trimmed and lowercased.
    pub name: String,
}

/// Response body for `POST /reminders/{subscriber_id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddReminderResponse {
    /// Subscriber identity.
    pub subscriber_id: i64,
    /// `added` or `already_tracked`.
    pub outcome: String,
}

impl AddReminderResponse {
    /// Builds the response for an add outcome.
    #[must_use]
    pub fn new(subscriber_id: i64, outcome: AddOutcome) -> Self {
        let outcome = match outcome {
            AddOutcome::Added => "added",
            AddOutcome::AlreadyTracked => "already_tracked",
        };
        Self {
            subscriber_id,
            outcome: outcome.to_string(),
        }
    }
}

/// Response body for `DELETE /reminders/{subscriber_id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClearRemindersResponse {
    /// `cleared` or `no_such_subscriber`.
    pub outcome: String,
}

impl From<ClearOutcome> for ClearRemindersResponse {
    fn from(outcome: ClearOutcome) -> Self {
        let outcome = match outcome {
            ClearOutcome::Cleared => "cleared",
            ClearOutcome::NoSuchSubscriber => "no_such_subscriber",
        };
        Self {
            outcome: outcome.to_string(),
        }
    }
}

/// Response body for `DELETE /reminders/{subscriber_id}/names/{name}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveReminderResponse {
    /// `removed` or `not_tracked`.
    pub outcome: String,
    /// Names removed.
    pub removed: u64,
}

impl From<RemoveOutcome> for RemoveReminderResponse {
    fn from(outcome: RemoveOutcome) -> Self {
        match outcome {
            RemoveOutcome::Removed { count } => Self {
                outcome: "removed".to_string(),
                removed: count,
            },
            RemoveOutcome::NotTracked => Self {
                outcome: "not_tracked".to_string(),
                removed: 0,
            },
        }
    }
}
