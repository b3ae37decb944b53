//! WebSocket feed integration tests over a real listener.

#![allow(clippy::panic, missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use lobbywatch::api;
use lobbywatch::app_state::AppState;
use lobbywatch::domain::{EventBus, EventTopic, PipelineEvent, StoredSession, SubscriberId};
use lobbywatch::notify::BroadcastNotifier;
use lobbywatch::persistence::sqlite::connect_in_memory;
use lobbywatch::persistence::{HourlyAverageStore, ReminderStore, SnapshotStore};
use lobbywatch::service::{Aggregator, LobbyService, ReminderMatcher, ReminderService};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Feed {
    url: String,
    bus: EventBus,
    reminders: Arc<ReminderService>,
}

async fn serve() -> Feed {
    let Ok(pool) = connect_in_memory().await else {
        panic!("in-memory database should open");
    };
    let event_bus = EventBus::new(64);
    let snapshots = SnapshotStore::new(pool.clone());
    let state = AppState {
        lobby: LobbyService::new(snapshots.clone()),
        aggregator: Aggregator::new(
            snapshots,
            HourlyAverageStore::new(pool.clone()),
            event_bus.clone(),
        ),
        reminders: Arc::new(ReminderService::new(ReminderStore::new(pool))),
        event_bus: event_bus.clone(),
    };
    let reminders = Arc::clone(&state.reminders);
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, api::build_app(state)).await;
    });
    Feed {
        url: format!("ws://{addr}/ws"),
        bus: event_bus,
        reminders,
    }
}

async fn connect(url: &str) -> Client {
    let Ok((client, _)) = connect_async(url).await else {
        panic!("websocket handshake failed");
    };
    client
}

async fn next_json(client: &mut Client) -> serde_json::Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(2), client.next()).await
        else {
            panic!("expected a message");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str(text.as_str()) else {
                panic!("server sent invalid JSON");
            };
            return value;
        }
    }
}

async fn command(client: &mut Client, id: &str, payload: serde_json::Value) -> serde_json::Value {
    let msg = serde_json::json!({
        "id": id,
        "type": "command",
        "timestamp": "2024-01-01T00:00:00Z",
        "payload": payload,
    });
    assert!(client.send(Message::text(msg.to_string())).await.is_ok());
    next_json(client).await
}

/// Waits until `count` connections hold a bus receiver.
async fn wait_for_receivers(bus: &EventBus, count: usize) {
    for _ in 0..100 {
        if bus.receiver_count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("connection never subscribed to the bus");
}

fn lobby_with(players: &[&str]) -> Vec<StoredSession> {
    vec![StoredSession {
        mod_id: "ca".to_string(),
        name: "lobby".to_string(),
        players: u32::try_from(players.len()).unwrap_or(0),
        max_players: 8,
        state: 1,
        protected: false,
        version: "1.05".to_string(),
        participants: players.iter().map(|p| (*p).to_string()).collect(),
    }]
}

fn tick(n: u64) -> PipelineEvent {
    PipelineEvent::TickCompleted {
        tick: n,
        timestamp: 1_704_067_200,
        total_players: 12,
        active_sessions: 3,
        persisted: true,
    }
}

#[tokio::test]
async fn subscribed_topic_is_forwarded() {
    let Feed { url, bus, .. } = serve().await;
    let mut client = connect(&url).await;
    wait_for_receivers(&bus, 1).await;

    let reply = command(
        &mut client,
        "sub-1",
        serde_json::json!({ "command": "subscribe", "topics": ["ticks"] }),
    )
    .await;
    assert_eq!(reply.get("id"), Some(&serde_json::json!("sub-1")));
    assert_eq!(reply.get("type"), Some(&serde_json::json!("response")));

    // Not subscribed: dropped server-side.
    bus.publish(PipelineEvent::HourlyAverageWritten {
        hour_start: 0,
        average_player_count: 1.0,
    });
    bus.publish(tick(7));

    let event = next_json(&mut client).await;
    assert_eq!(event.get("type"), Some(&serde_json::json!("event")));
    assert_eq!(
        event.pointer("/payload/event_type"),
        Some(&serde_json::json!("tick_completed"))
    );
    assert_eq!(event.pointer("/payload/tick"), Some(&serde_json::json!(7)));
}

#[tokio::test]
async fn wildcard_receives_reminders() {
    let Feed { url, bus, .. } = serve().await;
    let mut client = connect(&url).await;
    wait_for_receivers(&bus, 1).await;

    let reply = command(
        &mut client,
        "sub-all",
        serde_json::json!({ "command": "subscribe", "topics": ["*"] }),
    )
    .await;
    assert_eq!(reply.pointer("/payload/wildcard"), Some(&serde_json::json!(true)));

    bus.publish(PipelineEvent::ReminderMatched {
        subscriber_id: SubscriberId::new(42),
        names: vec!["bob".to_string()],
        matched_at: chrono::Utc::now(),
    });
    let event = next_json(&mut client).await;
    assert_eq!(
        event.pointer("/payload/event_type"),
        Some(&serde_json::json!("reminder_matched"))
    );
    assert_eq!(event.pointer("/payload/subscriber_id"), Some(&serde_json::json!(42)));
}

#[tokio::test]
async fn malformed_message_gets_error_reply() {
    let Feed { url, .. } = serve().await;
    let mut client = connect(&url).await;
    assert!(client.send(Message::text("{not json")).await.is_ok());
    let reply = next_json(&mut client).await;
    assert_eq!(reply.get("type"), Some(&serde_json::json!("error")));
    assert_eq!(reply.pointer("/payload/code"), Some(&serde_json::json!(400)));
}

#[tokio::test]
async fn reminders_wait_for_a_reminder_subscriber() {
    let Feed {
        url,
        bus,
        reminders,
    } = serve().await;
    let id = SubscriberId::new(42);
    assert!(reminders.add(id, "bob").await.is_ok());
    let matcher = ReminderMatcher::new(Arc::clone(&reminders), BroadcastNotifier::new(bus.clone()));
    let sessions = lobby_with(&["Bob"]);

    // Connected but idle: nothing forwards reminders.
    let mut client = connect(&url).await;
    wait_for_receivers(&bus, 1).await;
    let Ok(report) = matcher.run(&sessions, chrono::Utc::now()).await else {
        panic!("matcher run failed");
    };
    assert_eq!((report.notified, report.failed), (0, 1));

    // Watching ticks only still leaves the reminder tracked.
    let reply = command(
        &mut client,
        "sub-ticks",
        serde_json::json!({ "command": "subscribe", "topics": ["ticks"] }),
    )
    .await;
    assert_eq!(reply.get("type"), Some(&serde_json::json!("response")));
    let Ok(report) = matcher.run(&sessions, chrono::Utc::now()).await else {
        panic!("matcher run failed");
    };
    assert_eq!((report.notified, report.failed), (0, 1));
    let Ok(Some(set)) = reminders.get(id).await else {
        panic!("reminder should still be tracked");
    };
    assert!(set.tracked_names.contains("bob"));

    let reply = command(
        &mut client,
        "sub-reminders",
        serde_json::json!({ "command": "subscribe", "topics": ["reminders"] }),
    )
    .await;
    assert_eq!(reply.get("type"), Some(&serde_json::json!("response")));
    assert_eq!(bus.listeners(EventTopic::Reminders), 1);
    let Ok(report) = matcher.run(&sessions, chrono::Utc::now()).await else {
        panic!("matcher run failed");
    };
    assert_eq!((report.notified, report.failed), (1, 0));
    assert!(matches!(reminders.get(id).await, Ok(None)));

    let event = next_json(&mut client).await;
    assert_eq!(
        event.pointer("/payload/event_type"),
        Some(&serde_json::json!("reminder_matched"))
    );
    assert_eq!(event.pointer("/payload/subscriber_id"), Some(&serde_json::json!(42)));
}

#[tokio::test]
async fn closed_connection_releases_its_topics() {
    let Feed { url, bus, .. } = serve().await;
    let mut client = connect(&url).await;
    wait_for_receivers(&bus, 1).await;
    let _ = command(
        &mut client,
        "sub-all",
        serde_json::json!({ "command": "subscribe", "topics": ["*"] }),
    )
    .await;
    assert_eq!(bus.listeners(EventTopic::Reminders), 1);

    assert!(client.close(None).await.is_ok());
    for _ in 0..100 {
        if bus.listeners(EventTopic::Reminders) == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("closed connection kept its reminder subscription");
}
