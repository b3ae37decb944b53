//! Ordering of advertised mod version strings.
//!
//! Hosts advertise free-form versions such as `1.05.1`, `v1.04`,
//! `1.06-pre2` or `dev-20240101`. [`GameVersion`] compares them
//! component-wise so that numeric parts order numerically (`10.0` is newer
//! than `2.0`).

use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Component {
    Number(u64),
    Text(String),
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            // A release component outranks a textual tag at the same position,
            // so `1.06` > `1.06-pre2`.
            (Self::Number(_), Self::Text(_)) => Ordering::Greater,
            (Self::Text(_), Self::Number(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A parsed version string with numeric-aware ordering.
#[derive(Debug, Clone)]
pub struct GameVersion {
    display: String,
    components: Vec<Component>,
}

impl GameVersion {
    /// Parses `raw`, stripping a leading `v`/`V`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let display = strip_prefix(raw).to_string();
        let components = display
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<u64>() {
                Ok(n) => Component::Number(n),
                Err(_) => Component::Text(part.to_ascii_lowercase()),
            })
            .collect();
        Self {
            display,
            components,
        }
    }

    /// The version string without its `v` prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Development and pre-release builds (`dev`, `pre` in the string).
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        let lower = self.display.to_ascii_lowercase();
        lower.contains("dev") || lower.contains("pre")
    }
}

/// Strips one leading `v`/`V` when followed by a digit.
#[must_use]
pub fn strip_prefix(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.strip_prefix(['v', 'V']) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => trimmed,
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl Ord for GameVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        let zero = Component::Number(0);
        for i in 0..len {
            let a = self.components.get(i).unwrap_or(&zero);
            let b = other.components.get(i).unwrap_or(&zero);
            match a.cmp(b) {
                Ordering::Equal => {}
                non_eq => return non_eq,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for GameVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GameVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GameVersion {}
