//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::{Aggregator, LobbyService, ReminderService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Snapshot reads and the lobby view.
    pub lobby: LobbyService,
    /// Hour and day averages.
    pub aggregator: Aggregator,
    /// Reminder CRUD, sharing locks with the matcher.
    pub reminders: Arc<ReminderService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}
