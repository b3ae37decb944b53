//! Snapshot DTOs for the latest capture and range queries.

use serde::Serialize;
use utoipa::ToSchema;

use super::common_dto::ListMeta;
use crate::domain::{Snapshot, StoredSession};

/// One reduced session as stored in a snapshot.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionDto {
    /// Mod identifier.
    pub mod_id: String,
    /// Session display name.
    pub name: String,
    /// Current player count.
    pub players: u32,
    /// Slot capacity.
    pub max_players: u32,
    /// Protocol state code.
    pub state: i32,
    /// Password protected.
    pub protected: bool,
    /// Mod version.
    pub version: String,
    /// Non-bot participant names.
    pub participants: Vec<String>,
}

impl From<StoredSession> for SessionDto {
    fn from(s: StoredSession) -> Self {
        Self {
            mod_id: s.mod_id,
            name: s.name,
            players: s.players,
            max_players: s.max_players,
            state: s.state,
            protected: s.protected,
            version: s.version,
            participants: s.participants,
        }
    }
}

/// A snapshot with its derived totals.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SnapshotDto {
    /// Capture time, seconds since the epoch.
    pub timestamp: i64,
    /// Players across all sessions.
    pub total_players: u64,
    /// Sessions with at least one player.
    pub active_sessions: usize,
    /// Sessions in listing order.
    pub sessions: Vec<SessionDto>,
}

impl From<Snapshot> for SnapshotDto {
    fn from(snapshot: Snapshot) -> Self {
        let total_players = snapshot.total_players();
        let active_sessions = snapshot.active_sessions();
        Self {
            timestamp: snapshot.timestamp,
            total_players,
            active_sessions,
            sessions: snapshot.sessions.into_iter().map(SessionDto::from).collect(),
        }
    }
}

/// Response body for `GET /snapshots`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotListResponse {
    /// Snapshots, oldest first.
    pub data: Vec<SnapshotDto>,
    /// List metadata.
    pub meta: ListMeta,
}
