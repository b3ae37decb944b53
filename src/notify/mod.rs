//! Notification channels for reminder matches.
//!
//! A [`Notifier`] only reports success or failure; resolving a subscriber
//! to a chat endpoint and phrasing the message belong to whoever sits on
//! the other side of the channel.

pub mod broadcast;
pub mod webhook;

use std::future::Future;
use std::sync::Arc;

pub use broadcast::BroadcastNotifier;
pub use webhook::WebhookNotifier;

use crate::domain::ReminderNotification;
use crate::error::ServiceError;

/// Delivers reminder notifications to subscribers.
pub trait Notifier: Send + Sync {
    /// Attempts delivery of one notification.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::DeliveryFailure`] when the channel is
    /// unreachable or rejects the notification.
    fn deliver(
        &self,
        notification: &ReminderNotification,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

impl<T: Notifier> Notifier for Arc<T> {
    fn deliver(
        &self,
        notification: &ReminderNotification,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send {
        (**self).deliver(notification)
    }
}
