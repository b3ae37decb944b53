//! Lobby listing DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::snapshot_dto::SessionDto;
use crate::domain::{LobbyFilter, LobbyView};

/// Query parameters for `GET /lobby`.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LobbyParams {
    /// Include versions older than the newest one.
    #[serde(default)]
    pub show_outdated: bool,
    /// Include sessions without players.
    #[serde(default)]
    pub show_empty: bool,
}

impl From<LobbyParams> for LobbyFilter {
    fn from(p: LobbyParams) -> Self {
        Self {
            show_outdated: p.show_outdated,
            show_empty: p.show_empty,
        }
    }
}

/// Sessions sharing a version.
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionGroupDto {
    /// Version without its `v` prefix.
    pub version: String,
    /// Sessions, most players first.
    pub sessions: Vec<SessionDto>,
}

/// Response body for `GET /lobby`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LobbyResponse {
    /// Capture time of the underlying snapshot.
    pub timestamp: i64,
    /// Players across all sessions.
    pub total_players: u64,
    /// Sessions with players.
    pub active_sessions: usize,
    /// Newest advertised version.
    pub newest_version: Option<String>,
    /// Version groups, newest first.
    pub groups: Vec<VersionGroupDto>,
}

impl From<LobbyView> for LobbyResponse {
    fn from(view: LobbyView) -> Self {
        Self {
            timestamp: view.timestamp,
            total_players: view.total_players,
            active_sessions: view.active_sessions,
            newest_version: view.newest_version,
            groups: view
                .groups
                .into_iter()
                .map(|g| VersionGroupDto {
                    version: g.version,
                    sessions: g.sessions.into_iter().map(SessionDto::from).collect(),
                })
                .collect(),
        }
    }
}
