//! # Data-Fetch Channel
//!
//! Handles one request at a time, independently of every other request:
//!
//! 1. **Received**: count it.
//! 2. **Resolving**: pick the producer identity (the request's own, else the
//!    one recorded for the listener) and resolve it to a live producer.
//! 3. **Invoking**: call the producer, bounded by `fetch_timeout`. The
//!    producer future is dropped when the timeout elapses.
//! 4. **Responded** with `{listenerId, payload}`, **Suppressed** when the
//!    result is empty and the policy is `Suppress`, or **Failed**.
//!
//! The channel never retries.

use crate::config::{ChannelConfig, EmptyResultPolicy};
use crate::domain::{is_empty_payload, FetchOutcome, FetchState, ListenerRegistry};
use crate::error::FetchError;
use crate::metrics::{ChannelStats, ChannelStatsSnapshot};
use crate::ports::{DataFetchApi, ProducerResolver};
use async_trait::async_trait;
use grid_bus::ChannelMessage;
use grid_types::{DataRequest, DataResponse, ListenerId, ProducerIdentity};
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Server side of the data-fetch protocol.
pub struct DataFetchChannel {
    registry: Arc<ListenerRegistry>,
    resolver: Arc<dyn ProducerResolver>,
    config: ChannelConfig,
    stats: ChannelStats,
}

impl DataFetchChannel {
    pub fn new(
        registry: Arc<ListenerRegistry>,
        resolver: Arc<dyn ProducerResolver>,
        config: ChannelConfig,
    ) -> Self {
        Self {
            registry,
            resolver,
            config,
            stats: ChannelStats::default(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> ChannelStatsSnapshot {
        self.stats.snapshot()
    }

    /// Handle a request and turn the result into the message to emit, if any.
    pub async fn dispatch(&self, request: DataRequest) -> Option<ChannelMessage> {
        let listener_id = request.listener_id.clone();
        match self.process(request).await {
            Ok(FetchOutcome::Responded(response)) => Some(ChannelMessage::FetchResponded(response)),
            Ok(FetchOutcome::Suppressed { .. }) => None,
            Err(error) => Some(ChannelMessage::FetchFailed(error.to_failure(listener_id))),
        }
    }

    async fn process(&self, request: DataRequest) -> Result<FetchOutcome, FetchError> {
        self.stats.received.fetch_add(1, Ordering::Relaxed);
        transition(&request.listener_id, FetchState::Received);

        let started = Instant::now();
        let result = self.run(&request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(outcome) => {
                let counter = match outcome {
                    FetchOutcome::Responded(_) => &self.stats.responded,
                    FetchOutcome::Suppressed { .. } => &self.stats.suppressed,
                };
                counter.fetch_add(1, Ordering::Relaxed);
                debug!(
                    listener_id = %request.listener_id,
                    state = %outcome.state(),
                    elapsed_ms,
                    "Fetch completed"
                );
            }
            Err(error) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                if matches!(error, FetchError::Timeout { .. }) {
                    self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
                }
                warn!(
                    listener_id = %request.listener_id,
                    state = %FetchState::Failed,
                    code = error.code(),
                    error = %error,
                    elapsed_ms,
                    "Fetch failed"
                );
            }
        }

        result
    }

    async fn run(&self, request: &DataRequest) -> Result<FetchOutcome, FetchError> {
        let listener_id = &request.listener_id;

        transition(listener_id, FetchState::Resolving);
        if self.config.require_registration && !self.registry.is_registered(listener_id) {
            return Err(FetchError::UnknownListener {
                listener_id: listener_id.clone(),
            });
        }
        let identity = self.producer_identity(request)?;
        let producer = self
            .resolver
            .resolve(&identity)
            .ok_or_else(|| FetchError::ProducerResolution {
                identity: identity.clone(),
            })?;

        transition(listener_id, FetchState::Invoking);
        let timeout = self.config.fetch_timeout;
        let produced = tokio::time::timeout(timeout, producer.fetch_data(request))
            .await
            .map_err(|_| FetchError::Timeout {
                identity: identity.clone(),
                timeout_ms: timeout.as_millis() as u64,
            })?
            .map_err(|source| FetchError::Producer {
                identity: identity.clone(),
                source,
            })?;

        if !is_empty_payload(produced.as_ref()) {
            let payload = produced.unwrap_or(Value::Null);
            return Ok(FetchOutcome::Responded(DataResponse::new(
                listener_id.clone(),
                payload,
            )));
        }

        match self.config.empty_result_policy {
            EmptyResultPolicy::Suppress => Ok(FetchOutcome::Suppressed {
                listener_id: listener_id.clone(),
            }),
            EmptyResultPolicy::Acknowledge => {
                // Absent and null results are acknowledged as an empty row set.
                let payload = match produced {
                    Some(value) if !value.is_null() => value,
                    _ => Value::Array(Vec::new()),
                };
                Ok(FetchOutcome::Responded(DataResponse::new(
                    listener_id.clone(),
                    payload,
                )))
            }
        }
    }

    fn producer_identity(&self, request: &DataRequest) -> Result<ProducerIdentity, FetchError> {
        if let Some(identity) = &request.producer_identity {
            return Ok(identity.clone());
        }
        if let Some(identity) = self.registry.producer_for(&request.listener_id) {
            return Ok(identity);
        }
        if self.registry.is_registered(&request.listener_id) {
            Err(FetchError::MissingProducerIdentity {
                listener_id: request.listener_id.clone(),
            })
        } else {
            Err(FetchError::UnknownListener {
                listener_id: request.listener_id.clone(),
            })
        }
    }
}

#[async_trait]
impl DataFetchApi for DataFetchChannel {
    async fn handle(&self, request: DataRequest) -> Result<FetchOutcome, FetchError> {
        self.process(request).await
    }
}

fn transition(listener_id: &ListenerId, state: FetchState) {
    debug!(listener_id = %listener_id, state = %state, "Fetch state");
}
