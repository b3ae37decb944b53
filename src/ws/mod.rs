//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams pipeline events to clients
//! that subscribe to one or more topics.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
