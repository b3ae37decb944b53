//! Broadcast channel for pipeline events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The scheduler,
//! matcher and aggregator publish [`PipelineEvent`]s through the bus, and
//! every WebSocket connection subscribes to receive filtered events.
//!
//! A raw receiver does not mean anyone is interested in a given event: the
//! connection filters by topic. Connections therefore also register the
//! topics they forward, and [`EventBus::listeners`] reports that count.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::broadcast;

use super::{EventTopic, PipelineEvent};

/// Per-topic count of consumers that forward the topic.
#[derive(Debug, Default)]
struct TopicListeners {
    ticks: AtomicUsize,
    reminders: AtomicUsize,
    aggregates: AtomicUsize,
}

impl TopicListeners {
    const fn slot(&self, topic: EventTopic) -> &AtomicUsize {
        match topic {
            EventTopic::Ticks => &self.ticks,
            EventTopic::Reminders => &self.reminders,
            EventTopic::Aggregates => &self.aggregates,
        }
    }
}

/// Broadcast bus for [`PipelineEvent`]s.
///
/// When the ring buffer is full, the oldest events are dropped for lagging
/// receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PipelineEvent>,
    listeners: Arc<TopicListeners>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            listeners: Arc::default(),
        }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: PipelineEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Registers one consumer forwarding `topic`.
    pub fn add_listener(&self, topic: EventTopic) {
        self.listeners.slot(topic).fetch_add(1, Ordering::SeqCst);
    }

    /// Unregisters one consumer of `topic`. Never drops below zero.
    pub fn remove_listener(&self, topic: EventTopic) {
        let _ = self
            .listeners
            .slot(topic)
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// Number of consumers currently forwarding `topic`.
    #[must_use]
    pub fn listeners(&self, topic: EventTopic) -> usize {
        self.listeners.slot(topic).load(Ordering::SeqCst)
    }
}
