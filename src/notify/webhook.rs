//! Webhook delivery: `POST` the notification as JSON.

use std::time::Duration;

use super::Notifier;
use crate::domain::ReminderNotification;
use crate::error::ServiceError;

/// Posts each notification to a fixed URL. Any 2xx response counts as
/// delivered.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Builds a notifier for `url` with a whole-request `timeout`.
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
}

impl Notifier for WebhookNotifier {
    async fn deliver(&self, notification: &ReminderNotification) -> Result<(), ServiceError> {
        let failure = |reason: String| ServiceError::DeliveryFailure {
            subscriber_id: notification.subscriber_id,
            reason,
        };

        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(format!("webhook returned {status}")));
        }
        Ok(())
    }
}
