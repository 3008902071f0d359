//! # Channel Messages
//!
//! Every envelope that flows over the bus, plus topic-based filtering.

use grid_types::{ChannelFailure, DataRequest, DataResponse, ListenerId};
use serde::{Deserialize, Serialize};

/// All messages that can be published to the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body")]
pub enum ChannelMessage {
    /// A widget asks for its row data.
    /// Source: widget | Target: data-fetch channel
    FetchRequested(DataRequest),

    /// Row data for a widget.
    /// Source: data-fetch channel | Target: widget
    FetchResponded(DataResponse),

    /// Out-of-band failure for a request.
    /// Source: data-fetch channel | Target: widget
    FetchFailed(ChannelFailure),
}

impl ChannelMessage {
    /// Get the topic for this message (for filtering).
    #[must_use]
    pub fn topic(&self) -> MessageTopic {
        match self {
            Self::FetchRequested(_) => MessageTopic::Requests,
            Self::FetchResponded(_) => MessageTopic::Responses,
            Self::FetchFailed(_) => MessageTopic::Failures,
        }
    }

    /// Listener id this message is correlated with.
    #[must_use]
    pub fn listener_id(&self) -> &ListenerId {
        match self {
            Self::FetchRequested(request) => &request.listener_id,
            Self::FetchResponded(response) => &response.listener_id,
            Self::FetchFailed(failure) => &failure.listener_id,
        }
    }
}

/// Message topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageTopic {
    /// Inbound data-fetch requests.
    Requests,
    /// Successful responses.
    Responses,
    /// Failure signals.
    Failures,
    /// All messages (no filtering).
    All,
}

impl MessageTopic {
    /// Topics a message can actually carry.
    pub const CONCRETE: [MessageTopic; 3] = [Self::Requests, Self::Responses, Self::Failures];
}

/// Filter for subscribing to specific messages.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<MessageTopic>,
    /// Listener ids to include. Empty means all listeners.
    pub listeners: Vec<ListenerId>,
}

impl MessageFilter {
    /// Create a filter that accepts all messages.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<MessageTopic>) -> Self {
        Self {
            topics,
            listeners: Vec::new(),
        }
    }

    /// Filter for everything a widget receives (responses and failures).
    #[must_use]
    pub fn outbound() -> Self {
        Self::topics(vec![MessageTopic::Responses, MessageTopic::Failures])
    }

    /// Restrict the filter to specific listeners.
    #[must_use]
    pub fn for_listeners(mut self, listeners: Vec<ListenerId>) -> Self {
        self.listeners = listeners;
        self
    }

    /// Concrete topics this filter lets through, ignoring the listener restriction.
    #[must_use]
    pub fn receivable_topics(&self) -> Vec<MessageTopic> {
        if self.topics.is_empty() || self.topics.contains(&MessageTopic::All) {
            return MessageTopic::CONCRETE.to_vec();
        }
        MessageTopic::CONCRETE
            .into_iter()
            .filter(|topic| self.topics.contains(topic))
            .collect()
    }

    /// Check if a message matches this filter.
    #[must_use]
    pub fn matches(&self, message: &ChannelMessage) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&MessageTopic::All)
            || self.topics.contains(&message.topic());

        let listener_match =
            self.listeners.is_empty() || self.listeners.contains(message.listener_id());

        topic_match && listener_match
    }
}
