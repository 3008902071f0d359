//! # Grid Types Crate
//!
//! Identifiers and wire envelopes shared by every Grid-Bridge crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the data-fetch envelopes are defined once here
//!   and reused by the channel, the bus and the client.
//! - **Correlation by listener**: requests and responses are matched by
//!   [`ListenerId`]; there is no separate correlation token on the wire.
//! - **Out-of-band failures**: a failed fetch is a [`ChannelFailure`] signal,
//!   never a response payload with an error field.

pub mod entities;
pub mod envelope;
pub mod errors;

pub use entities::*;
pub use envelope::{codes, ChannelFailure, DataRequest, DataResponse};
pub use errors::IdentityError;
