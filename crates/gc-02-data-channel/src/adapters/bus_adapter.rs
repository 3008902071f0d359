//! Message bus adapter for the data-fetch channel
//!
//! Subscribes to inbound `FetchRequested` messages and handles each one in its
//! own task, so a slow producer never delays another listener's request.
//! Responses and failures are published back on the bus; suppressed fetches
//! publish nothing.

use crate::service::DataFetchChannel;
use grid_bus::{
    ChannelMessage, InMemoryMessageBus, MessageFilter, MessagePublisher, MessageTopic,
    Subscription,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Connects a [`DataFetchChannel`] to the message bus.
pub struct ChannelBusAdapter {
    bus: Arc<InMemoryMessageBus>,
    channel: Arc<DataFetchChannel>,
    subscription: Subscription,
}

impl ChannelBusAdapter {
    /// Create the adapter. The request subscription is taken immediately, so
    /// requests published after this call are never missed.
    pub fn new(bus: Arc<InMemoryMessageBus>, channel: Arc<DataFetchChannel>) -> Self {
        let subscription = bus.subscribe(MessageFilter::topics(vec![MessageTopic::Requests]));
        Self {
            bus,
            channel,
            subscription,
        }
    }

    /// Serve requests until `shutdown` flips to `true`, its sender is dropped,
    /// or the bus closes. Fetches still running at shutdown are cancelled.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("[ChannelBusAdapter] Started listening for fetch requests");
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(in_flight = tasks.len(), "[ChannelBusAdapter] Shutdown requested");
                        break;
                    }
                }
                message = self.subscription.recv() => {
                    match message {
                        Some(ChannelMessage::FetchRequested(request)) => {
                            let channel = self.channel.clone();
                            let bus = self.bus.clone();
                            tasks.spawn(async move {
                                if let Some(reply) = channel.dispatch(request).await {
                                    bus.publish(reply).await;
                                }
                            });
                        }
                        Some(other) => {
                            debug!(topic = ?other.topic(), "Ignoring non-request message");
                        }
                        None => {
                            warn!("[ChannelBusAdapter] Message stream ended, shutting down");
                            break;
                        }
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "Fetch task ended abnormally");
                    }
                }
            }
        }

        tasks.shutdown().await;
    }
}
