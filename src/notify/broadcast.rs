//! Event-bus delivery for consumers attached to the WebSocket feed.

use super::Notifier;
use crate::domain::{EventBus, EventTopic, PipelineEvent, ReminderNotification};
use crate::error::ServiceError;

/// Publishes each notification as a [`PipelineEvent::ReminderMatched`].
///
/// Delivery succeeds only when at least one feed consumer forwards the
/// `reminders` topic. Connections watching other topics do not count. With
/// nobody listening the match is kept and retried on the next tick.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    event_bus: EventBus,
}

impl BroadcastNotifier {
    /// Creates a notifier publishing on `event_bus`.
    #[must_use]
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }
}

impl Notifier for BroadcastNotifier {
    async fn deliver(&self, notification: &ReminderNotification) -> Result<(), ServiceError> {
        if self.event_bus.listeners(EventTopic::Reminders) == 0 {
            return Err(ServiceError::DeliveryFailure {
                subscriber_id: notification.subscriber_id,
                reason: "no feed consumer subscribed to reminders".to_string(),
            });
        }
        let receivers = self.event_bus.publish(PipelineEvent::ReminderMatched {
            subscriber_id: notification.subscriber_id,
            names: notification.names.clone(),
            matched_at: notification.matched_at,
        });
        if receivers == 0 {
            return Err(ServiceError::DeliveryFailure {
                subscriber_id: notification.subscriber_id,
                reason: "no feed consumer connected".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;

    use super::*;
    use crate::domain::SubscriberId;

    fn notification() -> ReminderNotification {
        let names: BTreeSet<String> = ["alice".to_string()].into_iter().collect();
        ReminderNotification::new(SubscriberId::new(1), &names, Utc::now())
    }

    #[tokio::test]
    async fn fails_without_receivers() {
        let notifier = BroadcastNotifier::new(EventBus::new(8));
        let result = notifier.deliver(&notification()).await;
        assert!(matches!(result, Err(ServiceError::DeliveryFailure { .. })));
    }

    #[tokio::test]
    async fn fails_when_only_other_topics_are_forwarded() {
        let bus = EventBus::new(8);
        let _rx = bus.subscribe();
        bus.add_listener(EventTopic::Ticks);
        let notifier = BroadcastNotifier::new(bus);
        let result = notifier.deliver(&notification()).await;
        assert!(matches!(result, Err(ServiceError::DeliveryFailure { .. })));
    }

    #[tokio::test]
    async fn publishes_reminder_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.add_listener(EventTopic::Reminders);
        let notifier = BroadcastNotifier::new(bus);
        assert!(notifier.deliver(&notification()).await.is_ok());

        let Ok(PipelineEvent::ReminderMatched { subscriber_id, names, .. }) = rx.recv().await
        else {
            panic!("expected reminder event");
        };
        assert_eq!(subscriber_id, SubscriberId::new(1));
        assert_eq!(names, vec!["alice".to_string()]);
    }
}
