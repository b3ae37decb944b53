//! Lobby listing sources.
//!
//! [`LobbySource`] is the seam between the scheduler and the remote
//! listing. [`HttpLobbySource`] is the production implementation; tests
//! drive the scheduler with scripted sources.

pub mod http;

use std::future::Future;
use std::sync::Arc;

pub use http::HttpLobbySource;

use crate::domain::SessionRecord;
use crate::error::ServiceError;

/// Fetches the current lobby listing.
pub trait LobbySource: Send + Sync {
    /// Returns every session currently advertised.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::FetchError`] when the listing cannot be
    /// retrieved or decoded.
    fn fetch(&self) -> impl Future<Output = Result<Vec<SessionRecord>, ServiceError>> + Send;
}

impl<T: LobbySource> LobbySource for Arc<T> {
    fn fetch(&self) -> impl Future<Output = Result<Vec<SessionRecord>, ServiceError>> + Send {
        (**self).fetch()
    }
}
