//! # GC-02 Data Channel
//!
//! Listener registry and request/response data-fetch channel between grid
//! widgets and server-side data producers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  FetchRequested   ┌───────────────────┐   fetch_data()  ┌──────────────┐
//! │ FetchClient  │ ────────────────→ │ ChannelBusAdapter │ ──────────────→ │ DataProducer │
//! │  (widget)    │                   │  DataFetchChannel │ ←────────────── │              │
//! └──────▲───────┘                   └─────────┬─────────┘  Option<Value>  └──────────────┘
//!        │        FetchResponded / FetchFailed │
//!        └──────── ResponseRouter ←────────────┘
//! ```
//!
//! - **Domain Layer** (`domain/`)
//!   - `ListenerRegistry`: check-and-set listener registrations
//!   - `PendingFetches`: single-flight correlation by listener id
//!   - `FetchOutcome` / `FetchState`: per-request lifecycle
//!
//! - **Ports Layer** (`ports/`)
//!   - `DataFetchApi` (inbound), `DataProducer` and `ProducerResolver` (outbound)
//!
//! - **Adapters Layer** (`adapters/`)
//!   - `ProducerRegistry`: explicit identity to producer mapping
//!   - `ChannelBusAdapter`: serves requests from the bus
//!
//! ## Invariants
//!
//! - A successful response is keyed by the listener id of its request.
//! - An empty producer result is suppressed by default: nothing is sent.
//! - A failure is reported out of band and never retried.
//! - At most one registration per listener id, however many racers.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{ChannelBusAdapter, FnProducer, ProducerFactory, ProducerRegistry, ProducerScope};
pub use client::{FetchClient, ResponseRouter};
pub use config::{ChannelConfig, ConfigError, EmptyResultPolicy};
pub use domain::{
    is_empty_payload, FetchOutcome, FetchReply, FetchState, ListenerRegistration,
    ListenerRegistry, PendingFetches, PendingStats,
};
pub use error::{ClientError, FetchError, ProducerError};
pub use metrics::{ChannelStats, ChannelStatsSnapshot};
pub use ports::{DataFetchApi, DataProducer, ProducerResolver};
pub use service::DataFetchChannel;
