//! Producer backed by a plain function.

use crate::error::ProducerError;
use crate::ports::DataProducer;
use async_trait::async_trait;
use grid_types::DataRequest;
use serde_json::Value;

/// Wraps a synchronous function as a [`DataProducer`].
///
/// Suited to in-memory data and tests; producers that do I/O should implement
/// the trait directly.
pub struct FnProducer<F> {
    func: F,
}

impl<F> FnProducer<F>
where
    F: Fn(&DataRequest) -> Result<Option<Value>, ProducerError> + Send + Sync + 'static,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> DataProducer for FnProducer<F>
where
    F: Fn(&DataRequest) -> Result<Option<Value>, ProducerError> + Send + Sync + 'static,
{
    async fn fetch_data(&self, request: &DataRequest) -> Result<Option<Value>, ProducerError> {
        (self.func)(request)
    }
}
