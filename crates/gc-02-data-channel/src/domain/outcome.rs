//! Request lifecycle and outcomes.
//!
//! ```text
//! Received ──→ Resolving ──→ Invoking ──┬──→ Responded
//!                  │                    ├──→ Suppressed
//!                  └────────────────────┴──→ Failed
//! ```

use grid_types::{DataResponse, ListenerId};
use serde_json::Value;
use std::fmt;

/// States one request passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchState {
    Received,
    Resolving,
    Invoking,
    Responded,
    Suppressed,
    Failed,
}

impl FetchState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Responded | Self::Suppressed | Self::Failed)
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Resolving => "resolving",
            Self::Invoking => "invoking",
            Self::Responded => "responded",
            Self::Suppressed => "suppressed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Successful end of a request. Failures are [`crate::FetchError`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A response to emit on the listener's correlation key.
    Responded(DataResponse),
    /// The producer had nothing to return and nothing is emitted.
    Suppressed { listener_id: ListenerId },
}

impl FetchOutcome {
    #[must_use]
    pub fn state(&self) -> FetchState {
        match self {
            Self::Responded(_) => FetchState::Responded,
            Self::Suppressed { .. } => FetchState::Suppressed,
        }
    }

    #[must_use]
    pub fn response(&self) -> Option<&DataResponse> {
        match self {
            Self::Responded(response) => Some(response),
            Self::Suppressed { .. } => None,
        }
    }

    #[must_use]
    pub fn into_response(self) -> Option<DataResponse> {
        match self {
            Self::Responded(response) => Some(response),
            Self::Suppressed { .. } => None,
        }
    }
}

/// Whether a producer result counts as "nothing to return":
/// absent, `null`, `[]` or `{}`.
#[must_use]
pub fn is_empty_payload(payload: Option<&Value>) -> bool {
    match payload {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(members)) => members.is_empty(),
        Some(_) => false,
    }
}
