//! # Message Publisher
//!
//! The sending half of the bus plus the in-process broadcast implementation.

use crate::messages::{ChannelMessage, MessageFilter, MessageTopic};
use crate::subscriber::{MessageStream, Subscription, TopicCounts};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

/// Sending side of the bus.
///
/// The fetch client and the channel adapter only ever see this trait.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish a message and return how many receivers it reached.
    ///
    /// The count includes receivers whose filter will discard the message.
    async fn publish(&self, message: ChannelMessage) -> usize;

    /// Live subscriptions able to receive `topic`. `All` counts every subscription.
    fn subscribers_for(&self, topic: MessageTopic) -> usize;

    /// Publish attempts since creation, delivered or not.
    fn messages_published(&self) -> u64;
}

/// Single-process bus over `tokio::sync::broadcast`.
///
/// Every subscriber sees every message; [`MessageFilter`] is applied on the
/// receiving side.
pub struct InMemoryMessageBus {
    sender: broadcast::Sender<ChannelMessage>,
    topic_counts: Arc<TopicCounts>,
    published: AtomicU64,
    capacity: usize,
}

impl InMemoryMessageBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// A bus whose slowest subscriber may fall `capacity` messages behind
    /// before it starts losing the oldest ones. Zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            topic_counts: Arc::new(TopicCounts::default()),
            published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to messages matching `filter`, starting with the next publish.
    #[must_use]
    pub fn subscribe(&self, filter: MessageFilter) -> Subscription {
        debug!(
            topics = ?filter.receivable_topics(),
            listeners = filter.listeners.len(),
            "Subscribing to bus"
        );
        Subscription::new(self.sender.subscribe(), filter, Arc::clone(&self.topic_counts))
    }

    #[must_use]
    pub fn message_stream(&self, filter: MessageFilter) -> MessageStream {
        MessageStream::new(self.subscribe(filter))
    }

    /// Live receivers, regardless of filter.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn subscribers_for(&self, topic: MessageTopic) -> usize {
        self.topic_counts.get(topic)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryMessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryMessageBus {
    async fn publish(&self, message: ChannelMessage) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);

        let topic = message.topic();
        let listener_id = message.listener_id().clone();
        let Ok(receivers) = self.sender.send(message) else {
            warn!(?topic, %listener_id, "No live receivers, message dropped");
            return 0;
        };

        if self.topic_counts.get(topic) == 0 {
            debug!(?topic, %listener_id, "No subscription accepts this topic");
        }
        trace!(?topic, %listener_id, receivers, "Message published");
        receivers
    }

    fn subscribers_for(&self, topic: MessageTopic) -> usize {
        InMemoryMessageBus::subscribers_for(self, topic)
    }

    fn messages_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
