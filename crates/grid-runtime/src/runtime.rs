//! # Grid Runtime
//!
//! Owns every long-lived piece of the system and the tasks that connect them.
//!
//! ```text
//!                    ┌───────────────── InMemoryMessageBus ─────────────────┐
//!                    │                                                      │
//! FetchClient ──publish──→ [Requests] ──→ ChannelBusAdapter ──→ DataFetchChannel
//!      ▲                                         │                   │
//!      │                                         ▼                   ▼
//! ResponseRouter ←── [Responses|Failures] ←── publish          ProducerRegistry
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Build registries, channel, controller and client
//! 3. `start()`: spawn the bus adapter and response router
//! 4. `shutdown()`: flip the watch signal and join both tasks

use crate::config::RuntimeConfig;
use gc_01_grid_options::InMemoryComponentRegistry;
use gc_02_data_channel::{
    ChannelBusAdapter, ConfigError, DataFetchChannel, FetchClient, ListenerRegistry,
    ProducerRegistry, ResponseRouter,
};
use gc_03_grid_component::GridComponentController;
use grid_bus::{InMemoryMessageBus, MessageTopic};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How long `shutdown()` waits for each background task.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Runtime lifecycle errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("runtime already started")]
    AlreadyStarted,
}

/// The assembled grid runtime.
pub struct GridRuntime {
    config: RuntimeConfig,
    bus: Arc<InMemoryMessageBus>,
    listeners: Arc<ListenerRegistry>,
    producers: Arc<ProducerRegistry>,
    components: Arc<InMemoryComponentRegistry>,
    channel: Arc<DataFetchChannel>,
    controller: GridComponentController,
    client: Arc<FetchClient>,
    started: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl GridRuntime {
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        info!(
            fetch_timeout_ms = config.channel.fetch_timeout.as_millis() as u64,
            client_timeout_ms = config.channel.client_timeout.as_millis() as u64,
            empty_result_policy = ?config.channel.empty_result_policy,
            bus_capacity = config.bus_capacity,
            "Creating grid runtime"
        );

        let bus = Arc::new(InMemoryMessageBus::with_capacity(config.bus_capacity));
        let listeners = Arc::new(ListenerRegistry::new());
        let producers = Arc::new(ProducerRegistry::new());
        let components = Arc::new(InMemoryComponentRegistry::new());

        let channel = Arc::new(DataFetchChannel::new(
            listeners.clone(),
            producers.clone(),
            config.channel.clone(),
        ));
        let controller = GridComponentController::new(listeners.clone(), components.clone())
            .with_producer_check(producers.clone());
        let client = Arc::new(FetchClient::from_config(bus.clone(), &config.channel));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            bus,
            listeners,
            producers,
            components,
            channel,
            controller,
            client,
            started: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Spawn the bus adapter and the response router.
    ///
    /// Both subscribe before this returns, so fetches issued right after
    /// `start()` are never lost.
    pub fn start(&self) -> Result<(), RuntimeError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(RuntimeError::AlreadyStarted);
        }

        let adapter = ChannelBusAdapter::new(self.bus.clone(), self.channel.clone());
        let router = ResponseRouter::new(&self.bus, self.client.pending().clone());

        let mut tasks = self.tasks.lock();
        tasks.push(tokio::spawn(adapter.run(self.shutdown_rx.clone())));
        tasks.push(tokio::spawn(router.run(self.shutdown_rx.clone())));

        info!(
            request_subscribers = self.bus.subscribers_for(MessageTopic::Requests),
            reply_subscribers = self.bus.subscribers_for(MessageTopic::Responses),
            "Grid runtime started"
        );
        Ok(())
    }

    /// Signal every background task to stop and wait for them.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Background task ended abnormally"),
                Err(_) => warn!("Background task did not stop in time"),
            }
        }

        let stats = self.channel.stats();
        let pending = self.client.pending().stats();
        info!(
            received = stats.received,
            responded = stats.responded,
            suppressed = stats.suppressed,
            failed = stats.failed,
            client_timeouts = pending.timed_out,
            client_in_flight = pending.in_flight,
            "Shutdown complete"
        );
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<InMemoryMessageBus> {
        &self.bus
    }

    pub fn listeners(&self) -> &Arc<ListenerRegistry> {
        &self.listeners
    }

    /// Register producers here before grids that name them are initialized.
    pub fn producers(&self) -> &Arc<ProducerRegistry> {
        &self.producers
    }

    pub fn components(&self) -> &Arc<InMemoryComponentRegistry> {
        &self.components
    }

    pub fn channel(&self) -> &Arc<DataFetchChannel> {
        &self.channel
    }

    pub fn controller(&self) -> &GridComponentController {
        &self.controller
    }

    pub fn client(&self) -> &Arc<FetchClient> {
        &self.client
    }
}
