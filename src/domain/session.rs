//! Lobby session records as delivered by the listing endpoint.
//!
//! [`SessionRecord`] mirrors one entry of the remote JSON listing. It is
//! ephemeral: the scheduler reduces it to a
//! [`StoredSession`](super::snapshot::StoredSession) before anything is
//! persisted or matched.

use serde::{Deserialize, Deserializer};

/// One connected client of a lobby session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParticipantRecord {
    /// Player display name.
    #[serde(default)]
    pub name: String,
    /// Whether the slot is occupied by an AI bot.
    #[serde(default, rename = "isbot", deserialize_with = "lenient_bool")]
    pub is_bot: bool,
}

/// One game session from the lobby listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionRecord {
    /// Mod identifier (e.g. `"ca"`).
    #[serde(default, rename = "mod")]
    pub mod_id: String,
    /// Session display name.
    #[serde(default)]
    pub name: String,
    /// Number of players currently in the session.
    #[serde(default)]
    pub players: u32,
    /// Slot capacity of the session.
    #[serde(default, rename = "maxplayers")]
    pub max_players: u32,
    /// Protocol state code (1 = waiting, 2 = playing).
    #[serde(default)]
    pub state: i32,
    /// Whether the session is password protected.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub protected: bool,
    /// Mod version string as advertised by the host.
    #[serde(default)]
    pub version: String,
    /// Connected clients in slot order.
    #[serde(default)]
    pub clients: Vec<ParticipantRecord>,
}

impl SessionRecord {
    /// Returns `true` if this session belongs to the given mod
    /// (case-insensitive).
    #[must_use]
    pub fn is_mod(&self, mod_id: &str) -> bool {
        self.mod_id.eq_ignore_ascii_case(mod_id)
    }
}

/// Accepts `true`/`false`, `0`/`1` and their string spellings.
///
/// The listing has historically emitted booleans in more than one shape.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_i64().is_some_and(|v| v != 0),
        serde_json::Value::String(s) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1")
        }
        _ => false,
    })
}
