//! Driving port: how the dispatch framework hands requests to the channel.

use crate::domain::FetchOutcome;
use crate::error::FetchError;
use async_trait::async_trait;
use grid_types::DataRequest;

/// Primary API of the data-fetch channel.
#[async_trait]
pub trait DataFetchApi: Send + Sync {
    /// Handle one request to completion.
    ///
    /// Requests are independent and may be handled concurrently.
    async fn handle(&self, request: DataRequest) -> Result<FetchOutcome, FetchError>;
}
