//! Error types for the data-fetch channel

use grid_types::{codes, ChannelFailure, ListenerId, ProducerIdentity};
use thiserror::Error;

/// Errors reported by a data producer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProducerError {
    #[error("{0}")]
    Failed(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

/// Terminal failures of one fetch request.
///
/// Every variant becomes a [`ChannelFailure`] on the channel; none is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("no producer registered as `{identity}`")]
    ProducerResolution { identity: ProducerIdentity },

    #[error("no producer identity supplied or recorded for listener `{listener_id}`")]
    MissingProducerIdentity { listener_id: ListenerId },

    #[error("listener `{listener_id}` is not registered")]
    UnknownListener { listener_id: ListenerId },

    #[error("producer `{identity}` failed: {source}")]
    Producer {
        identity: ProducerIdentity,
        #[source]
        source: ProducerError,
    },

    #[error("producer `{identity}` did not answer within {timeout_ms} ms")]
    Timeout {
        identity: ProducerIdentity,
        timeout_ms: u64,
    },
}

impl FetchError {
    /// Stable failure code carried on the wire.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::ProducerResolution { .. } => codes::PRODUCER_NOT_FOUND,
            Self::MissingProducerIdentity { .. } => codes::PRODUCER_NOT_SPECIFIED,
            Self::UnknownListener { .. } => codes::LISTENER_NOT_REGISTERED,
            Self::Producer {
                source: ProducerError::InvalidRequest(_),
                ..
            } => codes::INVALID_REQUEST,
            Self::Producer { .. } => codes::PRODUCER_FAILED,
            Self::Timeout { .. } => codes::TIMEOUT,
        }
    }

    /// Out-of-band failure signal for `listener_id`.
    #[must_use]
    pub fn to_failure(&self, listener_id: ListenerId) -> ChannelFailure {
        ChannelFailure::new(listener_id, self.code(), self.to_string())
    }
}

/// Errors seen by a widget-side [`crate::FetchClient`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("a fetch for listener `{listener_id}` is already in flight")]
    AlreadyInFlight { listener_id: ListenerId },

    #[error("too many fetches in flight (limit {limit})")]
    Saturated { limit: usize },

    #[error("no reply for listener `{listener_id}` within {timeout_ms} ms")]
    Timeout {
        listener_id: ListenerId,
        timeout_ms: u64,
    },

    #[error("fetch failed with code {code}: {message}")]
    Failed { code: i32, message: String },

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("response channel closed")]
    ChannelClosed,
}

impl From<ChannelFailure> for ClientError {
    fn from(failure: ChannelFailure) -> Self {
        Self::Failed {
            code: failure.code,
            message: failure.message,
        }
    }
}
