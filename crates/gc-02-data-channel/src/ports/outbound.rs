//! Driven ports: the producers that supply row data and the facility that
//! finds them.

use crate::error::ProducerError;
use async_trait::async_trait;
use grid_types::{DataRequest, ProducerIdentity};
use serde_json::Value;
use std::sync::Arc;

/// Supplies row data for a widget.
///
/// Returning `Ok(None)`, `null`, `[]` or `{}` means "nothing to return".
/// Implementations may suspend on I/O; the channel bounds every call with a
/// timeout and drops the future when it elapses.
#[async_trait]
pub trait DataProducer: Send + Sync {
    async fn fetch_data(&self, request: &DataRequest) -> Result<Option<Value>, ProducerError>;
}

/// Turns a producer identity into a live producer.
pub trait ProducerResolver: Send + Sync {
    /// `None` when nothing is registered under `identity`.
    fn resolve(&self, identity: &ProducerIdentity) -> Option<Arc<dyn DataProducer>>;

    /// Whether `identity` is registered. Never builds a producer.
    fn contains(&self, identity: &ProducerIdentity) -> bool;

    /// Every identity that currently resolves.
    fn identities(&self) -> Vec<ProducerIdentity>;
}
