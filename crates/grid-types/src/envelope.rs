//! # Data-Fetch Envelopes
//!
//! Wire shapes exchanged over the bidirectional message channel.
//!
//! ```text
//! inbound   { "listenerId": "grid-42", "producerIdentity": "orders", ...opaque }
//! outbound  { "listenerId": "grid-42", "payload": [...] }
//! failure   { "listenerId": "grid-42", "code": -32001, "message": "..." }
//! ```
//!
//! The listener id is the correlation key: a response carries the id of the
//! request it answers and nothing else.

use crate::entities::{ListenerId, ProducerIdentity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable failure codes carried by [`ChannelFailure`].
///
/// Values follow the JSON-RPC server-error range so a client that already
/// speaks JSON-RPC can map them without a translation table.
pub mod codes {
    /// The producer identity could not be resolved to a live producer.
    pub const PRODUCER_NOT_FOUND: i32 = -32001;
    /// No producer identity was supplied and none was recorded for the listener.
    pub const PRODUCER_NOT_SPECIFIED: i32 = -32002;
    /// The producer itself reported an error.
    pub const PRODUCER_FAILED: i32 = -32003;
    /// The listener id was never registered (or has been torn down).
    pub const LISTENER_NOT_REGISTERED: i32 = -32004;
    /// The producer did not answer within the configured timeout.
    pub const TIMEOUT: i32 = -32006;
    /// The request was malformed.
    pub const INVALID_REQUEST: i32 = -32600;
}

/// Inbound data-fetch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    /// Listener the response must be correlated with.
    pub listener_id: ListenerId,

    /// Producer to invoke. When absent the channel falls back to the
    /// producer recorded when the listener was registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_identity: Option<ProducerIdentity>,

    /// Caller-supplied opaque fields (paging window, sort model, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl DataRequest {
    /// Create a request for a listener without naming a producer.
    #[must_use]
    pub fn new(listener_id: ListenerId) -> Self {
        Self {
            listener_id,
            producer_identity: None,
            fields: Map::new(),
        }
    }

    /// Builder-style method to name the producer explicitly.
    #[must_use]
    pub fn with_producer(mut self, producer: ProducerIdentity) -> Self {
        self.producer_identity = Some(producer);
        self
    }

    /// Builder-style method to attach an opaque field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Look up an opaque field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Parse a request from its JSON wire form.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Outbound data-fetch response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    /// Listener this response answers.
    pub listener_id: ListenerId,
    /// Row data produced for the listener.
    pub payload: Value,
}

impl DataResponse {
    /// Create a response for a listener.
    #[must_use]
    pub fn new(listener_id: ListenerId, payload: Value) -> Self {
        Self {
            listener_id,
            payload,
        }
    }

    /// The payload keyed by listener id, as delivered to the widget:
    /// `{ "<listenerId>": payload }`.
    #[must_use]
    pub fn keyed(&self) -> Value {
        let mut body = Map::new();
        body.insert(self.listener_id.to_string(), self.payload.clone());
        Value::Object(body)
    }
}

/// Out-of-band failure signal for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelFailure {
    /// Listener whose request failed.
    pub listener_id: ListenerId,
    /// Failure code, see [`codes`].
    pub code: i32,
    /// Human-readable description.
    pub message: String,
}

impl ChannelFailure {
    /// Create a failure signal.
    pub fn new(listener_id: ListenerId, code: i32, message: impl Into<String>) -> Self {
        Self {
            listener_id,
            code,
            message: message.into(),
        }
    }
}
