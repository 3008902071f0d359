//! # Widget-Side Fetch Client
//!
//! Request/response correlation over the bus, keyed by listener id.
//!
//! ```text
//! FetchClient ── register(listener) ──→ PendingFetches ←── complete() ── ResponseRouter
//!      │                                     │                                ▲
//!      └── publish FetchRequested ──→ bus ───┼──→ channel ──→ FetchResponded ─┘
//!                                            └── timeout ──→ ClientError::Timeout
//! ```
//!
//! A suppressed fetch produces no message at all, so the client timeout is
//! the only signal a requester gets for it.

use crate::config::ChannelConfig;
use crate::domain::PendingFetches;
use crate::error::ClientError;
use grid_bus::{
    ChannelMessage, InMemoryMessageBus, MessageFilter, MessagePublisher, MessageTopic, Subscription,
};
use grid_types::{DataRequest, DataResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Sends fetch requests and waits for their correlated replies.
pub struct FetchClient {
    publisher: Arc<dyn MessagePublisher>,
    pending: Arc<PendingFetches>,
}

impl FetchClient {
    pub fn new(publisher: Arc<dyn MessagePublisher>, pending: Arc<PendingFetches>) -> Self {
        Self { publisher, pending }
    }

    /// Client with its own pending store sized from `config`.
    pub fn from_config(publisher: Arc<dyn MessagePublisher>, config: &ChannelConfig) -> Self {
        Self::new(
            publisher,
            Arc::new(PendingFetches::new(config.client_timeout, config.max_in_flight)),
        )
    }

    /// The pending store a [`ResponseRouter`] must complete.
    #[must_use]
    pub fn pending(&self) -> &Arc<PendingFetches> {
        &self.pending
    }

    /// Fetch with the default client timeout.
    pub async fn fetch(&self, request: DataRequest) -> Result<DataResponse, ClientError> {
        self.fetch_with_timeout(request, None).await
    }

    /// Publish `request` and wait for the reply on its listener id.
    pub async fn fetch_with_timeout(
        &self,
        request: DataRequest,
        timeout: Option<Duration>,
    ) -> Result<DataResponse, ClientError> {
        let listener_id = request.listener_id.clone();
        let timeout = timeout.unwrap_or_else(|| self.pending.default_timeout());

        if self.publisher.subscribers_for(MessageTopic::Requests) == 0 {
            return Err(ClientError::Publish(
                "no subscriber accepts fetch requests".to_string(),
            ));
        }

        let rx = self.pending.register(&listener_id, Some(timeout))?;
        let receivers = self
            .publisher
            .publish(ChannelMessage::FetchRequested(request))
            .await;
        debug!(listener_id = %listener_id, receivers, "Sent fetch request");

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(Ok(response))) => Ok(response),
            Ok(Ok(Err(failure))) => Err(failure.into()),
            Ok(Err(_)) => Err(ClientError::ChannelClosed),
            Err(_) => {
                self.pending.expire(&listener_id);
                Err(ClientError::Timeout {
                    listener_id,
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

/// How often [`ResponseRouter`] sweeps the pending store.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Completes pending fetches from the replies seen on the bus.
pub struct ResponseRouter {
    pending: Arc<PendingFetches>,
    subscription: Subscription,
}

impl ResponseRouter {
    /// Subscribes immediately, so replies published after this call are
    /// never missed.
    pub fn new(bus: &InMemoryMessageBus, pending: Arc<PendingFetches>) -> Self {
        Self {
            pending,
            subscription: bus.subscribe(MessageFilter::outbound()),
        }
    }

    /// Route replies until `shutdown` flips to `true`, its sender is dropped,
    /// or the bus closes.
    ///
    /// Abandoned and overdue entries are swept every [`SWEEP_INTERVAL`].
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("[ResponseRouter] Started routing replies");
        let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = sweep.tick() => {
                    let removed = self.pending.remove_expired();
                    if removed > 0 {
                        debug!(removed, "[ResponseRouter] Swept stale pending fetches");
                    }
                }
                message = self.subscription.recv() => {
                    match message {
                        Some(message) => {
                            self.route(message);
                        }
                        None => {
                            warn!("[ResponseRouter] Reply stream ended, stopping");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Complete the fetch a reply belongs to. Returns whether one was waiting.
    pub fn route(&self, message: ChannelMessage) -> bool {
        match message {
            ChannelMessage::FetchResponded(response) => {
                let listener_id = response.listener_id.clone();
                self.pending.complete(&listener_id, Ok(response))
            }
            ChannelMessage::FetchFailed(failure) => {
                let listener_id = failure.listener_id.clone();
                self.pending.complete(&listener_id, Err(failure))
            }
            ChannelMessage::FetchRequested(_) => false,
        }
    }
}
