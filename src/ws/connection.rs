//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{ParsedTopics, WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::PipelineEvent;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards events of subscribed topics from the [`broadcast::Receiver`].
///
/// `subs` is dropped with the connection, which releases its topics.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<PipelineEvent>,
    mut subs: SubscriptionManager,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if !subs.matches(event.topic()) {
                            continue;
                        }
                        let Some(json) = event_json(&event) else {
                            continue;
                        };
                        tracing::trace!(event_type = event.event_type_str(), "forwarding event");
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

fn event_json(event: &PipelineEvent) -> Option<String> {
    let payload = serde_json::to_value(event).ok()?;
    let msg = WsMessage::new(uuid::Uuid::new_v4().to_string(), WsMessageType::Event, payload);
    serde_json::to_string(&msg).ok()
}

/// Handles a text message from the client, returning an optional JSON response.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error(String::new(), 400, "malformed JSON")).ok();
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let payload = match command {
        WsCommand::Subscribe { topics } => {
            let parsed = ParsedTopics::parse(&topics);
            subs.subscribe(&parsed.topics, parsed.wildcard);
            serde_json::json!({
                "subscribed": subs.topics(),
                "wildcard": subs.is_subscribed_all(),
                "rejected": parsed.rejected,
            })
        }
        WsCommand::Unsubscribe { topics } => {
            let parsed = ParsedTopics::parse(&topics);
            subs.unsubscribe(&parsed.topics, parsed.wildcard);
            serde_json::json!({
                "subscribed": subs.topics(),
                "wildcard": subs.is_subscribed_all(),
                "rejected": parsed.rejected,
            })
        }
    };

    let response = WsMessage::new(msg.id, WsMessageType::Response, payload);
    serde_json::to_string(&response).ok()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::EventTopic;

    fn reply(text: &str, subs: &mut SubscriptionManager) -> serde_json::Value {
        let Some(json) = handle_text_message(text, subs) else {
            panic!("expected a reply");
        };
        let Ok(value) = serde_json::from_str(&json) else {
            panic!("reply should be JSON");
        };
        value
    }

    #[test]
    fn malformed_json_is_error() {
        let mut subs = SubscriptionManager::new();
        let value = reply("not json", &mut subs);
        assert_eq!(value.get("type"), Some(&serde_json::json!("error")));
    }

    #[test]
    fn subscribe_updates_filter() {
        let mut subs = SubscriptionManager::new();
        let text = r#"{"id":"1","type":"command","timestamp":"2024-01-01T00:00:00Z",
            "payload":{"command":"subscribe","topics":["reminders","bogus"]}}"#;
        let value = reply(text, &mut subs);
        assert_eq!(value.get("id"), Some(&serde_json::json!("1")));
        assert_eq!(value.get("type"), Some(&serde_json::json!("response")));
        let Some(payload) = value.get("payload") else {
            panic!("payload missing");
        };
        assert_eq!(payload.get("rejected"), Some(&serde_json::json!(["bogus"])));
        assert!(subs.matches(EventTopic::Reminders));
        assert!(!subs.matches(EventTopic::Ticks));
    }

    #[test]
    fn unknown_command_is_error() {
        let mut subs = SubscriptionManager::new();
        let text = r#"{"id":"2","type":"command","timestamp":"2024-01-01T00:00:00Z",
            "payload":{"command":"swap"}}"#;
        let value = reply(text, &mut subs);
        assert_eq!(value.get("type"), Some(&serde_json::json!("error")));
    }

    #[test]
    fn event_is_wrapped_in_envelope() {
        let event = PipelineEvent::HourlyAverageWritten {
            hour_start: 3_600,
            average_player_count: 2.5,
        };
        let Some(json) = event_json(&event) else {
            panic!("event should serialize");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&json) else {
            panic!("valid JSON");
        };
        assert_eq!(value.get("type"), Some(&serde_json::json!("event")));
        let Some(payload) = value.get("payload") else {
            panic!("payload missing");
        };
        assert_eq!(
            payload.get("event_type"),
            Some(&serde_json::json!("hourly_average_written"))
        );
    }
}
