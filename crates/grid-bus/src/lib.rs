//! # Grid Bus - Message Dispatch for the Data-Fetch Channel
//!
//! Carries data-fetch envelopes between widgets and the server-side channel.
//!
//! ```text
//! ┌──────────────┐   FetchRequested    ┌──────────────────┐
//! │ FetchClient  │ ──────────────────→ │                  │
//! │  (widget)    │                     │  Message Bus     │
//! │              │ ←────────────────── │                  │
//! └──────────────┘  FetchResponded /   └────────┬─────────┘
//!                   FetchFailed                 │ subscribe()
//!                                               ▼
//!                                      ┌──────────────────┐
//!                                      │ DataFetchChannel │
//!                                      └──────────────────┘
//! ```
//!
//! The bus is reliable and ordered per subscriber. Transport framing below the
//! envelope level is not modelled; a networked deployment swaps
//! [`InMemoryMessageBus`] for a transport-backed [`MessagePublisher`].

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod messages;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use messages::{ChannelMessage, MessageFilter, MessageTopic};
pub use publisher::{InMemoryMessageBus, MessagePublisher};
pub use subscriber::{MessageStream, Subscription, SubscriptionError};

/// Maximum messages to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
