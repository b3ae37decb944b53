//! Type-safe subscriber identifier.
//!
//! [`SubscriberId`] is a newtype around the opaque integer identity the
//! chat platform assigns to a user, so that it cannot be confused with
//! timestamps or other integers flowing through the pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque identity of a reminder subscriber.
///
/// Used as the key of a reminder record in the store, as the lock key in
/// [`super::SubscriberLocks`], and as the delivery target of a
/// notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(i64);

impl SubscriberId {
    /// Wraps a raw subscriber identity.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer identity.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubscriberId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i64> for SubscriberId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<SubscriberId> for i64 {
    fn from(id: SubscriberId) -> Self {
        id.0
    }
}
