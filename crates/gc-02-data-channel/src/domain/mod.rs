//! Domain layer for the data-fetch channel.

pub mod outcome;
pub mod pending;
pub mod registry;

pub use outcome::{is_empty_payload, FetchOutcome, FetchState};
pub use pending::{FetchReply, PendingFetches, PendingStats};
pub use registry::{ListenerRegistration, ListenerRegistry};
