//! # lobbywatch
//!
//! Telemetry and notification pipeline for a multiplayer game lobby
//! listing.
//!
//! A poll scheduler fetches the listing on a fixed interval, reduces it to
//! one mod's sessions, persists every Nth capture as a snapshot, notifies
//! subscribers whose tracked player names came online, and maintains a
//! table of hourly player-count averages. A REST API and a WebSocket feed
//! expose the results.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── SchedulerContext ── LobbySource (source/)
//!     │       ├── ReminderMatcher ── Notifier (notify/)
//!     │       └── Aggregator
//!     ├── LobbyService / ReminderService (service/)
//!     ├── EventBus, SubscriberLocks (domain/)
//!     │
//!     └── SQLite Persistence (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod service;
pub mod source;
pub mod ws;
