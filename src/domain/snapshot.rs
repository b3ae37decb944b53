//! Reduced, persistable view of one lobby listing capture.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::reminder::normalize_name;
use super::session::SessionRecord;

/// A session with bot participants removed and non-essential fields
/// stripped. This is the shape stored in the snapshot table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Mod identifier.
    pub mod_id: String,
    /// Session display name.
    pub name: String,
    /// Player count reported by the listing.
    pub players: u32,
    /// Slot capacity.
    pub max_players: u32,
    /// Protocol state code.
    pub state: i32,
    /// Whether the session is password protected.
    pub protected: bool,
    /// Mod version string.
    pub version: String,
    /// Names of non-bot participants, in slot order.
    pub participants: Vec<String>,
}

impl From<SessionRecord> for StoredSession {
    fn from(record: SessionRecord) -> Self {
        Self {
            mod_id: record.mod_id,
            name: record.name,
            players: record.players,
            max_players: record.max_players,
            state: record.state,
            protected: record.protected,
            version: record.version,
            participants: record
                .clients
                .into_iter()
                .filter(|c| !c.is_bot)
                .map(|c| c.name)
                .collect(),
        }
    }
}

/// One timestamped capture of the filtered session listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Capture time in seconds since the Unix epoch.
    pub timestamp: i64,
    /// Reduced sessions in listing order.
    pub sessions: Vec<StoredSession>,
}

impl Snapshot {
    /// Creates a snapshot from already-reduced sessions.
    #[must_use]
    pub fn new(timestamp: i64, sessions: Vec<StoredSession>) -> Self {
        Self {
            timestamp,
            sessions,
        }
    }

    /// Sum of reported players across all sessions.
    #[must_use]
    pub fn total_players(&self) -> u64 {
        total_players(&self.sessions)
    }

    /// Number of sessions with at least one player.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.iter().filter(|s| s.players > 0).count()
    }

    /// Normalized names of every participant in the capture.
    #[must_use]
    pub fn active_names(&self) -> HashSet<String> {
        active_names(&self.sessions)
    }
}

/// Keeps the sessions of `mod_id` and reduces each one.
#[must_use]
pub fn reduce(records: Vec<SessionRecord>, mod_id: &str) -> Vec<StoredSession> {
    records
        .into_iter()
        .filter(|r| r.is_mod(mod_id))
        .map(StoredSession::from)
        .collect()
}

/// Sum of reported players across `sessions`.
#[must_use]
pub fn total_players(sessions: &[StoredSession]) -> u64 {
    sessions.iter().map(|s| u64::from(s.players)).sum()
}

/// Normalized participant names across `sessions`.
#[must_use]
pub fn active_names(sessions: &[StoredSession]) -> HashSet<String> {
    sessions
        .iter()
        .flat_map(|s| s.participants.iter())
        .filter_map(|name| normalize_name(name))
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::session::ParticipantRecord;

    fn record(mod_id: &str, players: u32, clients: &[(&str, bool)]) -> SessionRecord {
        SessionRecord {
            mod_id: mod_id.to_string(),
            name: format!("{mod_id} lobby"),
            players,
            max_players: 8,
            state: 1,
            protected: false,
            version: "1.05".to_string(),
            clients: clients
                .iter()
                .map(|(name, is_bot)| ParticipantRecord {
                    name: (*name).to_string(),
                    is_bot: *is_bot,
                })
                .collect(),
        }
    }

    #[test]
    fn reduce_filters_mod_and_bots() {
        let sessions = reduce(
            vec![
                record("ca", 2, &[("Bob", false), ("Bobby", true)]),
                record("ra", 3, &[("Carol", false)]),
                record("CA", 0, &[]),
            ],
            "ca",
        );
        assert_eq!(sessions.len(), 2);
        let Some(first) = sessions.first() else {
            panic!("expected a session");
        };
        assert_eq!(first.participants, vec!["Bob".to_string()]);
    }

    #[test]
    fn totals_and_active_sessions() {
        let snapshot = Snapshot::new(
            0,
            reduce(
                vec![
                    record("ca", 2, &[("a", false), ("b", false)]),
                    record("ca", 0, &[]),
                    record("ca", 5, &[]),
                ],
                "ca",
            ),
        );
        assert_eq!(snapshot.total_players(), 7);
        assert_eq!(snapshot.active_sessions(), 2);
    }

    #[test]
    fn active_names_are_normalized() {
        let sessions = reduce(vec![record("ca", 1, &[("  aLICE ", false)])], "ca");
        let names = active_names(&sessions);
        assert!(names.contains("alice"));
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn stored_session_json_has_no_bot_fields() {
        let sessions = reduce(vec![record("ca", 1, &[("x", false)])], "ca");
        let json = serde_json::to_string(&sessions).unwrap_or_default();
        assert!(!json.contains("is_bot"));
        assert!(json.contains("participants"));
    }
}
