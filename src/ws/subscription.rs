//! Per-connection subscription manager.
//!
//! Tracks which event topics a WebSocket client is subscribed to and
//! provides server-side event filtering. When attached to an [`EventBus`],
//! the manager keeps the bus's per-topic listener counts in step with what
//! the connection forwards.

use std::collections::HashSet;

use crate::domain::{EventBus, EventTopic};

/// Manages the set of topic subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed topics. If `subscribe_all` is true, this set is ignored.
    topics: HashSet<EventTopic>,
    /// Whether the client subscribes to every topic (wildcard `"*"`).
    subscribe_all: bool,
    /// Bus whose listener counts mirror this connection's topics.
    bus: Option<EventBus>,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty manager that registers its topics on `bus`.
    #[must_use]
    pub fn attached(bus: EventBus) -> Self {
        Self {
            topics: HashSet::new(),
            subscribe_all: false,
            bus: Some(bus),
        }
    }

    /// Adds topics to the subscription set. `wildcard` enables every topic.
    pub fn subscribe(&mut self, topics: &[EventTopic], wildcard: bool) {
        let before = self.forwarded();
        if wildcard {
            self.subscribe_all = true;
        }
        self.topics.extend(topics.iter().copied());
        self.sync_listeners(&before);
    }

    /// Removes topics from the subscription set. `wildcard` drops every
    /// subscription, including the wildcard itself.
    pub fn unsubscribe(&mut self, topics: &[EventTopic], wildcard: bool) {
        let before = self.forwarded();
        if wildcard {
            self.subscribe_all = false;
            self.topics.clear();
        } else {
            for topic in topics {
                self.topics.remove(topic);
            }
        }
        self.sync_listeners(&before);
    }

    /// Returns `true` if events of `topic` should be forwarded.
    #[must_use]
    pub fn matches(&self, topic: EventTopic) -> bool {
        self.subscribe_all || self.topics.contains(&topic)
    }

    /// Explicitly subscribed topics, sorted by name.
    #[must_use]
    pub fn topics(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.topics.iter().map(|t| t.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }

    fn forwarded(&self) -> Vec<EventTopic> {
        EventTopic::ALL
            .into_iter()
            .filter(|topic| self.matches(*topic))
            .collect()
    }

    fn sync_listeners(&self, before: &[EventTopic]) {
        let Some(bus) = &self.bus else {
            return;
        };
        for topic in EventTopic::ALL {
            match (before.contains(&topic), self.matches(topic)) {
                (false, true) => bus.add_listener(topic),
                (true, false) => bus.remove_listener(topic),
                _ => {}
            }
        }
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        let Some(bus) = &self.bus else {
            return;
        };
        for topic in self.forwarded() {
            bus.remove_listener(topic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(EventTopic::Ticks));
    }

    #[test]
    fn subscribe_specific_topic() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[EventTopic::Reminders], false);
        assert!(mgr.matches(EventTopic::Reminders));
        assert!(!mgr.matches(EventTopic::Ticks));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(EventTopic::Ticks));
        assert!(mgr.matches(EventTopic::Aggregates));
    }

    #[test]
    fn unsubscribe_removes_topic() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[EventTopic::Ticks, EventTopic::Aggregates], false);
        mgr.unsubscribe(&[EventTopic::Ticks], false);
        assert!(!mgr.matches(EventTopic::Ticks));
        assert_eq!(mgr.topics(), vec!["aggregates"]);
    }

    #[test]
    fn attached_manager_tracks_bus_listeners() {
        let bus = EventBus::new(8);
        let mut mgr = SubscriptionManager::attached(bus.clone());
        mgr.subscribe(&[EventTopic::Ticks], false);
        assert_eq!(bus.listeners(EventTopic::Ticks), 1);
        assert_eq!(bus.listeners(EventTopic::Reminders), 0);

        // Wildcard on top of an explicit topic counts each topic once.
        mgr.subscribe(&[EventTopic::Reminders], true);
        assert_eq!(bus.listeners(EventTopic::Ticks), 1);
        assert_eq!(bus.listeners(EventTopic::Reminders), 1);
        assert_eq!(bus.listeners(EventTopic::Aggregates), 1);

        mgr.unsubscribe(&[], true);
        assert_eq!(bus.listeners(EventTopic::Reminders), 0);

        mgr.subscribe(&[EventTopic::Reminders], false);
        drop(mgr);
        assert_eq!(bus.listeners(EventTopic::Reminders), 0);
    }

    #[test]
    fn wildcard_unsubscribe_clears_all() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[EventTopic::Ticks], true);
        mgr.unsubscribe(&[], true);
        assert!(!mgr.is_subscribed_all());
        assert!(!mgr.matches(EventTopic::Ticks));
    }
}
