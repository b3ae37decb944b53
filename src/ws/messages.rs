//! WebSocket message types: envelope and commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::EventTopic;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server-originated message stamped with the current time.
    #[must_use]
    pub fn new(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error reply with a numeric code.
    #[must_use]
    pub fn error(id: String, code: u16, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to event topics.
    Subscribe {
        /// Topic names. Use `["*"]` for every topic.
        topics: Vec<String>,
    },
    /// Unsubscribe from event topics.
    Unsubscribe {
        /// Topic names. `"*"` drops every subscription.
        topics: Vec<String>,
    },
}

/// Topic names split into known topics, the wildcard, and rejects.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedTopics {
    /// Recognised topics.
    pub topics: Vec<EventTopic>,
    /// Whether `"*"` was present.
    pub wildcard: bool,
    /// Names that are not topics.
    pub rejected: Vec<String>,
}

impl ParsedTopics {
    /// Classifies raw topic names.
    #[must_use]
    pub fn parse(raw: &[String]) -> Self {
        let mut parsed = Self::default();
        for name in raw {
            if name == "*" {
                parsed.wildcard = true;
            } else if let Ok(topic) = name.parse::<EventTopic>() {
                parsed.topics.push(topic);
            } else {
                parsed.rejected.push(name.clone());
            }
        }
        parsed
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_subscribe_command() {
        let json = serde_json::json!({ "command": "subscribe", "topics": ["ticks", "*"] });
        let Ok(WsCommand::Subscribe { topics }) = serde_json::from_value::<WsCommand>(json) else {
            panic!("expected subscribe");
        };
        assert_eq!(topics, vec!["ticks".to_string(), "*".to_string()]);
    }

    #[test]
    fn classifies_topics() {
        let raw = vec!["reminders".to_string(), "*".to_string(), "pools".to_string()];
        let parsed = ParsedTopics::parse(&raw);
        assert_eq!(parsed.topics, vec![EventTopic::Reminders]);
        assert!(parsed.wildcard);
        assert_eq!(parsed.rejected, vec!["pools".to_string()]);
    }

    #[test]
    fn envelope_uses_type_key() {
        let msg = WsMessage::error(String::new(), 400, "malformed JSON");
        let Ok(value) = serde_json::to_value(&msg) else {
            panic!("serializable");
        };
        assert_eq!(value.get("type"), Some(&serde_json::json!("error")));
    }
}
