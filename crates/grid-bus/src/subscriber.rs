//! # Message Subscriber
//!
//! Defines the subscription side of the bus.

use crate::messages::{ChannelMessage, MessageFilter, MessageTopic};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was closed.
    #[error("Message bus closed")]
    Closed,
}

/// Live subscriptions per topic. `All` counts every subscription.
#[derive(Debug, Default)]
pub(crate) struct TopicCounts {
    counts: Mutex<HashMap<MessageTopic, usize>>,
}

impl TopicCounts {
    fn acquire(&self, topics: &[MessageTopic]) {
        let mut counts = self.counts.lock();
        *counts.entry(MessageTopic::All).or_insert(0) += 1;
        for topic in topics {
            *counts.entry(*topic).or_insert(0) += 1;
        }
    }

    fn release(&self, topics: &[MessageTopic]) {
        let mut counts = self.counts.lock();
        for topic in topics.iter().chain(std::iter::once(&MessageTopic::All)) {
            if let Some(count) = counts.get_mut(topic) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    counts.remove(topic);
                }
            }
        }
    }

    pub(crate) fn get(&self, topic: MessageTopic) -> usize {
        self.counts.lock().get(&topic).copied().unwrap_or(0)
    }
}

/// Holds a subscription's place in [`TopicCounts`] until dropped.
struct SubscriptionGuard {
    counts: Arc<TopicCounts>,
    topics: Vec<MessageTopic>,
}

impl SubscriptionGuard {
    fn new(counts: Arc<TopicCounts>, topics: Vec<MessageTopic>) -> Self {
        counts.acquire(&topics);
        Self { counts, topics }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.counts.release(&self.topics);
        debug!(topics = ?self.topics, "Subscription dropped");
    }
}

/// A subscription handle for receiving messages.
///
/// When dropped, the subscription is automatically cleaned up.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<ChannelMessage>,

    /// Filter for this subscription.
    filter: MessageFilter,

    /// Bookkeeping released on drop.
    guard: SubscriptionGuard,
}

impl Subscription {
    /// Create a new subscription and count it against its topics.
    pub(crate) fn new(
        receiver: broadcast::Receiver<ChannelMessage>,
        filter: MessageFilter,
        counts: Arc<TopicCounts>,
    ) -> Self {
        let topics = filter.receivable_topics();
        Self {
            receiver,
            filter,
            guard: SubscriptionGuard::new(counts, topics),
        }
    }

    /// Receive the next message that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next matching message
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<ChannelMessage> {
        loop {
            let message = match self.receiver.recv().await {
                Ok(m) => m,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some messages dropped");
                    continue;
                }
            };

            if self.filter.matches(&message) {
                return Some(message);
            }
        }
    }

    /// Try to receive the next message without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A message was available and matched
    /// - `Ok(None)` - No message available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<ChannelMessage>, SubscriptionError> {
        loop {
            let message = match self.receiver.try_recv() {
                Ok(m) => m,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&message) {
                return Ok(Some(message));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &MessageFilter {
        &self.filter
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators. The
/// stream is woken by the broadcast channel, so an idle stream costs nothing.
pub struct MessageStream {
    inner: BroadcastStream<ChannelMessage>,
    filter: MessageFilter,
    _guard: SubscriptionGuard,
}

impl MessageStream {
    /// Create a new message stream from a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        let Subscription {
            receiver,
            filter,
            guard,
        } = subscription;
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
            _guard: guard,
        }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &MessageFilter {
        &self.filter
    }
}

impl Stream for MessageStream {
    type Item = ChannelMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(message))) => {
                    if self.filter.matches(&message) {
                        return Poll::Ready(Some(message));
                    }
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    debug!(lagged = count, "Stream lagged, some messages dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::InMemoryMessageBus;
    use crate::MessagePublisher;
    use futures::StreamExt;
    use grid_types::{DataRequest, DataResponse, ListenerId};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn listener() -> ListenerId {
        ListenerId::new("grid-1").unwrap()
    }

    #[tokio::test]
    async fn test_subscription_recv() {
        let bus = InMemoryMessageBus::new();
        let mut sub = bus.subscribe(MessageFilter::all());

        bus.publish(ChannelMessage::FetchRequested(DataRequest::new(listener())))
            .await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("message");

        assert!(matches!(received, ChannelMessage::FetchRequested(_)));
    }

    #[tokio::test]
    async fn test_subscription_filter() {
        let bus = InMemoryMessageBus::new();
        let mut sub = bus.subscribe(MessageFilter::topics(vec![MessageTopic::Responses]));

        // Request should be filtered out
        bus.publish(ChannelMessage::FetchRequested(DataRequest::new(listener())))
            .await;
        bus.publish(ChannelMessage::FetchResponded(DataResponse::new(
            listener(),
            json!([1, 2]),
        )))
        .await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("message");

        assert!(matches!(received, ChannelMessage::FetchResponded(_)));
    }

    #[tokio::test]
    async fn test_subscription_drop_cleanup() {
        let bus = InMemoryMessageBus::new();

        {
            let _sub1 = bus.subscribe(MessageFilter::all());
            let _sub2 = bus.subscribe(MessageFilter::outbound());
            assert_eq!(bus.subscriber_count(), 2);
            assert_eq!(bus.subscribers_for(MessageTopic::Requests), 1);
            assert_eq!(bus.subscribers_for(MessageTopic::Responses), 2);
            assert_eq!(bus.subscribers_for(MessageTopic::All), 2);
        }

        assert_eq!(bus.subscriber_count(), 0);
        for topic in MessageTopic::CONCRETE {
            assert_eq!(bus.subscribers_for(topic), 0);
        }
        assert_eq!(bus.subscribers_for(MessageTopic::All), 0);
    }

    #[tokio::test]
    async fn test_stream_keeps_its_count() {
        let bus = InMemoryMessageBus::new();
        let stream = bus.message_stream(MessageFilter::topics(vec![MessageTopic::Requests]));
        assert_eq!(bus.subscribers_for(MessageTopic::Requests), 1);

        drop(stream);
        assert_eq!(bus.subscribers_for(MessageTopic::Requests), 0);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = InMemoryMessageBus::new();
        let mut sub = bus.subscribe(MessageFilter::all());

        assert!(matches!(sub.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_stream_yields_matching_messages() {
        let bus = InMemoryMessageBus::new();
        let mut stream = bus.message_stream(MessageFilter::outbound());

        bus.publish(ChannelMessage::FetchRequested(DataRequest::new(listener())))
            .await;
        bus.publish(ChannelMessage::FetchResponded(DataResponse::new(
            listener(),
            json!("rows"),
        )))
        .await;

        let next = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout")
            .expect("message");

        assert_eq!(
            next,
            ChannelMessage::FetchResponded(DataResponse::new(listener(), json!("rows")))
        );
    }

    #[tokio::test]
    async fn test_stream_ends_when_bus_dropped() {
        let bus = InMemoryMessageBus::new();
        let mut stream = bus.message_stream(MessageFilter::all());
        drop(bus);

        let next = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout");
        assert!(next.is_none());
    }
}
