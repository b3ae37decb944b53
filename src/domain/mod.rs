//! Domain layer: lobby data, reminders, time buckets and the event system.
//!
//! This module contains the pipeline's data model: raw and reduced lobby
//! sessions, snapshots, reminder records and outcomes, hour/day buckets,
//! version ordering for lobby views, the event bus for broadcasting
//! pipeline activity, and per-subscriber locks.

pub mod bucket;
pub mod event_bus;
pub mod lobby_view;
pub mod pipeline_event;
pub mod reminder;
pub mod session;
pub mod snapshot;
pub mod subscriber_id;
pub mod subscriber_locks;
pub mod version;

pub use bucket::{AggregationCursor, BucketAverage, TimeWindow};
pub use event_bus::EventBus;
pub use lobby_view::{LobbyFilter, LobbyView};
pub use pipeline_event::{EventTopic, PipelineEvent};
pub use reminder::{
    AddOutcome, ClearOutcome, ReminderMatch, ReminderNotification, ReminderSet, RemoveOutcome,
};
pub use session::{ParticipantRecord, SessionRecord};
pub use snapshot::{Snapshot, StoredSession};
pub use subscriber_id::SubscriberId;
pub use subscriber_locks::{SubscriberGuard, SubscriberLocks};
