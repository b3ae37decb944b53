//! Events emitted by the telemetry pipeline.
//!
//! Every completed tick, delivered reminder and written hourly bucket is
//! published as a [`PipelineEvent`] through the [`super::EventBus`] and
//! forwarded to WebSocket subscribers of the matching [`EventTopic`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SubscriberId;

/// Subscription topic of a pipeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTopic {
    /// Per-tick lobby summaries.
    Ticks,
    /// Reminder matches.
    Reminders,
    /// Newly written hourly averages.
    Aggregates,
}

impl EventTopic {
    /// Every topic, in wire-name order.
    pub const ALL: [Self; 3] = [Self::Aggregates, Self::Reminders, Self::Ticks];

    /// Wire name of the topic.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ticks => "ticks",
            Self::Reminders => "reminders",
            Self::Aggregates => "aggregates",
        }
    }
}

impl fmt::Display for EventTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventTopic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ticks" => Ok(Self::Ticks),
            "reminders" => Ok(Self::Reminders),
            "aggregates" => Ok(Self::Aggregates),
            other => Err(format!("unknown topic: {other}")),
        }
    }
}

/// Domain event emitted by the scheduler, matcher and aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A tick fetched and processed the listing.
    TickCompleted {
        /// Zero-based tick index.
        tick: u64,
        /// Capture time of the tick's snapshot.
        timestamp: i64,
        /// Players across all sessions of the configured mod.
        total_players: u64,
        /// Sessions with at least one player.
        active_sessions: usize,
        /// Whether the snapshot was written to the store this tick.
        persisted: bool,
    },

    /// Tracked names of a subscriber came online.
    ReminderMatched {
        /// Subscriber to notify.
        subscriber_id: SubscriberId,
        /// Matched names, sorted.
        names: Vec<String>,
        /// Detection time.
        matched_at: DateTime<Utc>,
    },

    /// A new hourly average row was stored.
    HourlyAverageWritten {
        /// Start of the hour bucket.
        hour_start: i64,
        /// Average concurrent players during the hour.
        average_player_count: f64,
    },
}

impl PipelineEvent {
    /// Returns the topic this event is published under.
    #[must_use]
    pub const fn topic(&self) -> EventTopic {
        match self {
            Self::TickCompleted { .. } => EventTopic::Ticks,
            Self::ReminderMatched { .. } => EventTopic::Reminders,
            Self::HourlyAverageWritten { .. } => EventTopic::Aggregates,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::TickCompleted { .. } => "tick_completed",
            Self::ReminderMatched { .. } => "reminder_matched",
            Self::HourlyAverageWritten { .. } => "hourly_average_written",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn tick_event_serializes_with_tag() {
        let event = PipelineEvent::TickCompleted {
            tick: 3,
            timestamp: 1_700_000_000,
            total_players: 12,
            active_sessions: 4,
            persisted: true,
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"tick_completed\""));
        assert!(json.contains("\"total_players\":12"));
        assert_eq!(event.topic(), EventTopic::Ticks);
    }

    #[test]
    fn reminder_event_topic() {
        let event = PipelineEvent::ReminderMatched {
            subscriber_id: SubscriberId::new(42),
            names: vec!["bob".to_string()],
            matched_at: Utc::now(),
        };
        assert_eq!(event.topic(), EventTopic::Reminders);
        assert_eq!(event.event_type_str(), "reminder_matched");
    }

    #[test]
    fn topic_round_trips_through_str() {
        for topic in [EventTopic::Ticks, EventTopic::Reminders, EventTopic::Aggregates] {
            let Ok(parsed) = topic.as_str().parse::<EventTopic>() else {
                panic!("topic should parse");
            };
            assert_eq!(parsed, topic);
        }
        assert!("presence".parse::<EventTopic>().is_err());
    }
}
