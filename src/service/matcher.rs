//! Reminder matching and consumption.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::ReminderService;
use crate::domain::snapshot::active_names;
use crate::domain::{
    ReminderMatch, ReminderNotification, ReminderSet, StoredSession, SubscriberId,
};
use crate::error::ServiceError;
use crate::notify::Notifier;

/// Subscribers whose tracked names intersect `active`.
///
/// Pure function of its inputs; subscribers with an empty intersection are
/// left out.
#[must_use]
pub fn find_matches(active: &HashSet<String>, reminders: &[ReminderSet]) -> Vec<ReminderMatch> {
    reminders
        .iter()
        .filter_map(|set| {
            let names = set.matching(active);
            (!names.is_empty()).then(|| ReminderMatch {
                subscriber_id: set.subscriber_id,
                names,
            })
        })
        .collect()
}

/// Outcome counts of one matcher run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Subscribers notified and consumed.
    pub notified: usize,
    /// Subscribers whose delivery failed; their names stay tracked.
    pub failed: usize,
}

/// Matches a snapshot against all reminders, delivers, and consumes.
#[derive(Debug)]
pub struct ReminderMatcher<N> {
    reminders: Arc<ReminderService>,
    notifier: N,
}

impl<N: Notifier> ReminderMatcher<N> {
    /// Creates a matcher delivering through `notifier`.
    #[must_use]
    pub fn new(reminders: Arc<ReminderService>, notifier: N) -> Self {
        Self {
            reminders,
            notifier,
        }
    }

    /// The notification channel.
    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Runs one matching pass over `sessions`.
    ///
    /// For each candidate the subscriber's lock is taken, the record is
    /// re-read, and the intersection recomputed, so a concurrent clear or
    /// remove is honoured. Names are consumed only after a successful
    /// delivery.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the reminder list cannot be read.
    /// Per-subscriber failures are logged and counted in the report.
    pub async fn run(
        &self,
        sessions: &[StoredSession],
        now: DateTime<Utc>,
    ) -> Result<MatchReport, ServiceError> {
        let active = active_names(sessions);
        let mut report = MatchReport::default();
        if active.is_empty() {
            return Ok(report);
        }

        let candidates = find_matches(&active, &self.reminders.list_all().await?);
        for candidate in candidates {
            match self.notify_one(candidate.subscriber_id, &active, now).await {
                Ok(true) => report.notified += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        subscriber_id = %candidate.subscriber_id,
                        error = %e,
                        "reminder delivery failed; names kept for retry"
                    );
                }
            }
        }
        Ok(report)
    }

    async fn notify_one(
        &self,
        subscriber_id: SubscriberId,
        active: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> Result<bool, ServiceError> {
        let guard = self.reminders.lock(subscriber_id).await;
        let Some(current) = self.reminders.get_locked(&guard).await? else {
            return Ok(false);
        };
        let matched = current.matching(active);
        if matched.is_empty() {
            return Ok(false);
        }

        let notification = ReminderNotification::new(subscriber_id, &matched, now);
        self.notifier.deliver(&notification).await?;
        self.reminders.consume(&guard, &matched).await?;
        tracing::info!(%subscriber_id, names = ?notification.names, "reminder delivered");
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::sync::Mutex;

    use super::*;
    use crate::persistence::ReminderStore;
    use crate::persistence::sqlite::connect_in_memory;

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<ReminderNotification>>,
        fail: AtomicBool,
    }

    impl Notifier for RecordingNotifier {
        async fn deliver(&self, notification: &ReminderNotification) -> Result<(), ServiceError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ServiceError::DeliveryFailure {
                    subscriber_id: notification.subscriber_id,
                    reason: "channel down".to_string(),
                });
            }
            self.sent.lock().await.push(notification.clone());
            Ok(())
        }
    }

    async fn setup() -> (
        Arc<ReminderService>,
        Arc<RecordingNotifier>,
        ReminderMatcher<Arc<RecordingNotifier>>,
    ) {
        let Ok(pool) = connect_in_memory().await else {
            panic!("in-memory database should open");
        };
        let reminders = Arc::new(ReminderService::new(ReminderStore::new(pool)));
        let notifier = Arc::new(RecordingNotifier::default());
        let matcher = ReminderMatcher::new(Arc::clone(&reminders), Arc::clone(&notifier));
        (reminders, notifier, matcher)
    }

    fn session(participants: &[&str]) -> StoredSession {
        StoredSession {
            mod_id: "ca".to_string(),
            name: "lobby".to_string(),
            players: u32::try_from(participants.len()).unwrap_or(0),
            max_players: 8,
            state: 1,
            protected: false,
            version: "1.05".to_string(),
            participants: participants.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn find_matches_skips_empty_intersections() {
        let mut a = ReminderSet::new(SubscriberId::new(1));
        a.tracked_names.insert("alice".to_string());
        let mut b = ReminderSet::new(SubscriberId::new(2));
        b.tracked_names.insert("zed".to_string());
        let active: HashSet<String> = ["alice".to_string()].into_iter().collect();

        let matches = find_matches(&active, &[a, b]);
        let [only] = matches.as_slice() else {
            panic!("expected exactly one match");
        };
        assert_eq!(only.subscriber_id, SubscriberId::new(1));
    }

    #[tokio::test]
    async fn consumed_exactly_once_on_success() {
        let (reminders, notifier, matcher) = setup().await;
        let id = SubscriberId::new(1);
        assert!(reminders.add(id, "alice").await.is_ok());
        let sessions = vec![session(&["alice"])];

        let Ok(first) = matcher.run(&sessions, Utc::now()).await else {
            panic!("first run failed");
        };
        assert_eq!(first.notified, 1);
        let Ok(second) = matcher.run(&sessions, Utc::now()).await else {
            panic!("second run failed");
        };
        assert_eq!(second, MatchReport::default());
        assert_eq!(notifier.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn kept_for_retry_on_failure() {
        let (reminders, notifier, matcher) = setup().await;
        let id = SubscriberId::new(1);
        assert!(reminders.add(id, "alice").await.is_ok());
        let sessions = vec![session(&["alice"])];

        notifier.fail.store(true, Ordering::SeqCst);
        let Ok(first) = matcher.run(&sessions, Utc::now()).await else {
            panic!("first run failed");
        };
        assert_eq!(first.failed, 1);
        assert!(matches!(reminders.get(id).await, Ok(Some(_))));

        notifier.fail.store(false, Ordering::SeqCst);
        let Ok(second) = matcher.run(&sessions, Utc::now()).await else {
            panic!("second run failed");
        };
        assert_eq!(second.notified, 1);
        assert!(matches!(reminders.get(id).await, Ok(None)));
    }

    #[tokio::test]
    async fn matching_ignores_case() {
        let (reminders, notifier, matcher) = setup().await;
        assert!(reminders.add(SubscriberId::new(3), "Alice").await.is_ok());
        let Ok(report) = matcher.run(&[session(&["aLICE"])], Utc::now()).await else {
            panic!("run failed");
        };
        assert_eq!(report.notified, 1);
        let sent = notifier.sent.lock().await;
        let Some(first) = sent.first() else {
            panic!("expected a delivery");
        };
        assert_eq!(first.names, vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn bot_participant_does_not_match() {
        let (reminders, notifier, matcher) = setup().await;
        let id = SubscriberId::new(42);
        assert!(reminders.add(id, "bob").await.is_ok());

        // Bots are dropped during reduction, leaving only "Bob".
        let record = crate::domain::SessionRecord {
            mod_id: "ca".to_string(),
            name: "lobby".to_string(),
            players: 2,
            max_players: 8,
            state: 1,
            protected: false,
            version: "1.05".to_string(),
            clients: vec![
                crate::domain::ParticipantRecord {
                    name: "Bob".to_string(),
                    is_bot: false,
                },
                crate::domain::ParticipantRecord {
                    name: "Bobby".to_string(),
                    is_bot: true,
                },
            ],
        };
        let sessions = crate::domain::snapshot::reduce(vec![record], "ca");

        let Ok(report) = matcher.run(&sessions, Utc::now()).await else {
            panic!("run failed");
        };
        assert_eq!(report.notified, 1);
        let sent = notifier.sent.lock().await;
        let [delivered] = sent.as_slice() else {
            panic!("expected exactly one delivery");
        };
        assert_eq!(delivered.subscriber_id, id);
        assert_eq!(delivered.names, vec!["bob".to_string()]);
        assert!(matches!(reminders.get(id).await, Ok(None)));
    }

    #[tokio::test]
    async fn only_matched_names_are_consumed() {
        let (reminders, _notifier, matcher) = setup().await;
        let id = SubscriberId::new(7);
        assert!(reminders.add(id, "alice").await.is_ok());
        assert!(reminders.add(id, "carol").await.is_ok());

        let Ok(_) = matcher.run(&[session(&["Alice", "dave"])], Utc::now()).await else {
            panic!("run failed");
        };
        let Ok(Some(set)) = reminders.get(id).await else {
            panic!("record should remain");
        };
        let expected: BTreeSet<String> = ["carol".to_string()].into_iter().collect();
        assert_eq!(set.tracked_names, expected);
    }

    #[tokio::test]
    async fn no_active_names_is_noop() {
        let (reminders, notifier, matcher) = setup().await;
        assert!(reminders.add(SubscriberId::new(1), "alice").await.is_ok());
        let Ok(report) = matcher.run(&[session(&[])], Utc::now()).await else {
            panic!("run failed");
        };
        assert_eq!(report, MatchReport::default());
        assert!(notifier.sent.lock().await.is_empty());
    }
}
