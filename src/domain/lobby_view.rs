//! Version-grouped view of a snapshot for lobby listings.
//!
//! Sessions are grouped by advertised version, newest first. By default
//! empty sessions and outdated versions are hidden; development and
//! pre-release builds are always kept since they have no stable ordering
//! against releases.

use std::collections::BTreeMap;

use serde::Serialize;

use super::snapshot::{Snapshot, StoredSession};
use super::version::GameVersion;

/// Which sessions a lobby view includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LobbyFilter {
    /// Keep sessions running a version older than the newest one.
    pub show_outdated: bool,
    /// Keep sessions with no players.
    pub show_empty: bool,
}

/// Sessions sharing one version string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionGroup {
    /// Version without its `v` prefix.
    pub version: String,
    /// Sessions sorted by player count, descending.
    pub sessions: Vec<StoredSession>,
}

/// A filtered, grouped view of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbyView {
    /// Capture time of the underlying snapshot.
    pub timestamp: i64,
    /// Players across all sessions of the snapshot, before filtering.
    pub total_players: u64,
    /// Sessions with players, before filtering.
    pub active_sessions: usize,
    /// Newest version among the considered sessions.
    pub newest_version: Option<String>,
    /// Groups ordered newest version first.
    pub groups: Vec<VersionGroup>,
}

impl LobbyView {
    /// Builds the view for `snapshot` under `filter`.
    #[must_use]
    pub fn build(snapshot: &Snapshot, filter: LobbyFilter) -> Self {
        let mut considered: Vec<(GameVersion, &StoredSession)> = snapshot
            .sessions
            .iter()
            .filter(|s| filter.show_empty || s.players > 0)
            .map(|s| (GameVersion::parse(&s.version), s))
            .collect();

        let newest = considered.iter().map(|(v, _)| v).max().cloned();

        if !filter.show_outdated
            && let Some(newest) = &newest
        {
            considered.retain(|(v, _)| v >= newest || v.is_prerelease());
        }

        let mut grouped: BTreeMap<String, (GameVersion, Vec<StoredSession>)> = BTreeMap::new();
        for (version, session) in considered {
            grouped
                .entry(version.as_str().to_string())
                .or_insert_with(|| (version.clone(), Vec::new()))
                .1
                .push(session.clone());
        }

        let mut groups: Vec<(GameVersion, VersionGroup)> = grouped
            .into_iter()
            .map(|(key, (version, mut sessions))| {
                sessions.sort_by(|a, b| b.players.cmp(&a.players));
                (
                    version,
                    VersionGroup {
                        version: key,
                        sessions,
                    },
                )
            })
            .collect();
        groups.sort_by(|(a, ga), (b, gb)| b.cmp(a).then_with(|| gb.version.cmp(&ga.version)));

        Self {
            timestamp: snapshot.timestamp,
            total_players: snapshot.total_players(),
            active_sessions: snapshot.active_sessions(),
            newest_version: newest.map(|v| v.as_str().to_string()),
            groups: groups.into_iter().map(|(_, g)| g).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn session(name: &str, version: &str, players: u32) -> StoredSession {
        StoredSession {
            mod_id: "ca".to_string(),
            name: name.to_string(),
            players,
            max_players: 8,
            state: 1,
            protected: false,
            version: version.to_string(),
            participants: Vec::new(),
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(
            100,
            vec![
                session("old", "1.04", 2),
                session("new-small", "v1.05", 1),
                session("new-big", "1.05", 4),
                session("empty", "1.05", 0),
                session("preview", "1.06-pre1", 3),
            ],
        )
    }

    #[test]
    fn default_hides_outdated_and_empty() {
        let view = LobbyView::build(&snapshot(), LobbyFilter::default());
        assert_eq!(view.total_players, 10);
        assert_eq!(view.active_sessions, 4);
        assert_eq!(view.newest_version.as_deref(), Some("1.06-pre1"));
        let versions: Vec<&str> = view.groups.iter().map(|g| g.version.as_str()).collect();
        assert_eq!(versions, vec!["1.06-pre1"]);
    }

    #[test]
    fn newest_release_kept_when_prerelease_absent() {
        let mut snap = snapshot();
        snap.sessions.retain(|s| s.name != "preview");
        let view = LobbyView::build(&snap, LobbyFilter::default());
        let Some(group) = view.groups.first() else {
            panic!("expected one group");
        };
        assert_eq!(view.groups.len(), 1);
        assert_eq!(group.version, "1.05");
        let names: Vec<&str> = group.sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["new-big", "new-small"]);
    }

    #[test]
    fn show_all_orders_newest_first() {
        let view = LobbyView::build(
            &snapshot(),
            LobbyFilter {
                show_outdated: true,
                show_empty: true,
            },
        );
        let versions: Vec<&str> = view.groups.iter().map(|g| g.version.as_str()).collect();
        assert_eq!(versions, vec!["1.06-pre1", "1.05", "1.04"]);
        let Some(current) = view.groups.get(1) else {
            panic!("expected 1.05 group");
        };
        assert_eq!(current.sessions.len(), 3);
    }

    #[test]
    fn empty_snapshot_has_no_groups() {
        let view = LobbyView::build(&Snapshot::new(5, Vec::new()), LobbyFilter::default());
        assert!(view.groups.is_empty());
        assert_eq!(view.newest_version, None);
    }
}
