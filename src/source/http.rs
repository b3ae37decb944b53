//! HTTP client for the master server's JSON game listing.

use std::time::Duration;

use super::LobbySource;
use crate::domain::SessionRecord;
use crate::error::ServiceError;

/// Fetches the listing with a `GET` to a fixed URL.
///
/// Non-success statuses, transport errors and undecodable bodies all map
/// to [`ServiceError::FetchError`].
#[derive(Debug, Clone)]
pub struct HttpLobbySource {
    client: reqwest::Client,
    url: String,
}

impl HttpLobbySource {
    /// Builds a source for `url` with a whole-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Internal`] if the HTTP client cannot be
    /// constructed.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lobbywatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The listing URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl LobbySource for HttpLobbySource {
    async fn fetch(&self) -> Result<Vec<SessionRecord>, ServiceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ServiceError::FetchError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::FetchError(format!(
                "{} returned {status}",
                self.url
            )));
        }

        let sessions = response
            .json::<Vec<SessionRecord>>()
            .await
            .map_err(|e| ServiceError::FetchError(format!("decode: {e}")))?;

        tracing::debug!(url = %self.url, sessions = sessions.len(), "listing fetched");
        Ok(sessions)
    }
}
