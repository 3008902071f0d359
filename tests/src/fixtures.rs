//! Shared builders for integration tests and benchmarks.

use gc_01_grid_options::{ColumnDefinition, CompositeConfiguration};
use gc_02_data_channel::{
    ChannelBusAdapter, ChannelConfig, DataFetchChannel, FetchClient, FnProducer,
    ListenerRegistry, ProducerError, ProducerRegistry, ResponseRouter,
};
use grid_bus::InMemoryMessageBus;
use grid_types::{DataRequest, ProducerIdentity};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::watch;

pub fn identity(name: &str) -> ProducerIdentity {
    ProducerIdentity::new(name).unwrap()
}

/// The two-slot composite whose flattened form is
/// `{"animateRows":true,"cellFlashDuration":500,"pagination":true,"paginationPageSize":50}`.
pub fn rendering_and_pagination() -> CompositeConfiguration {
    let mut composite = CompositeConfiguration::new();
    composite
        .configure_slot("rendering", |node| {
            node.set_bool("animateRows", true)
                .set_int("cellFlashDuration", 500);
        })
        .configure_slot("pagination", |node| {
            node.set_bool("pagination", true)
                .set_int("paginationPageSize", 50);
        });
    composite
}

/// Composite with `slots` slots of `keys_per_slot` distinct keys each.
pub fn wide_composite(slots: usize, keys_per_slot: usize) -> CompositeConfiguration {
    let mut composite = CompositeConfiguration::new();
    for s in 0..slots {
        composite.configure_slot(&format!("slot{s}"), |node| {
            for k in 0..keys_per_slot {
                node.set_int(format!("s{s}k{k}"), (s * keys_per_slot + k) as i64);
            }
        });
    }
    composite
}

/// Column tree `depth` levels deep with `fanout` children per group.
pub fn column_tree(depth: usize, fanout: usize) -> Vec<ColumnDefinition> {
    fn build(depth: usize, fanout: usize, prefix: &str) -> ColumnDefinition {
        if depth == 0 {
            return ColumnDefinition::leaf(prefix);
        }
        let children = (0..fanout)
            .map(|i| build(depth - 1, fanout, &format!("{prefix}_{i}")))
            .collect();
        ColumnDefinition::group(children).unwrap()
    }
    (0..fanout).map(|i| build(depth, fanout, &format!("c{i}"))).collect()
}

/// Producers used across the suite:
/// - `rows`: `["row1","row2"]`
/// - `empty`: no result
/// - `echo`: the request's `value` field
/// - `broken`: always fails
pub fn standard_producers() -> ProducerRegistry {
    ProducerRegistry::new()
        .with_producer(
            identity("rows"),
            FnProducer::new(|_: &DataRequest| Ok(Some(json!(["row1", "row2"])))),
        )
        .with_producer(identity("empty"), FnProducer::new(|_: &DataRequest| Ok(None)))
        .with_producer(
            identity("echo"),
            FnProducer::new(|request: &DataRequest| Ok(request.field("value").cloned())),
        )
        .with_producer(
            identity("broken"),
            FnProducer::new(|_: &DataRequest| -> Result<Option<Value>, ProducerError> {
                Err(ProducerError::Unavailable("database offline".into()))
            }),
        )
}

/// Channel, bus adapter, client and router wired over one bus.
pub struct ChannelHarness {
    pub bus: Arc<InMemoryMessageBus>,
    pub listeners: Arc<ListenerRegistry>,
    pub channel: Arc<DataFetchChannel>,
    pub client: Arc<FetchClient>,
    shutdown: watch::Sender<bool>,
}

impl ChannelHarness {
    /// Must be called inside a Tokio runtime.
    pub fn start(config: ChannelConfig, producers: ProducerRegistry) -> Self {
        let bus = Arc::new(InMemoryMessageBus::new());
        let listeners = Arc::new(ListenerRegistry::new());
        let channel = Arc::new(DataFetchChannel::new(
            listeners.clone(),
            Arc::new(producers),
            config.clone(),
        ));
        let client = Arc::new(FetchClient::from_config(bus.clone(), &config));

        let (shutdown, shutdown_rx) = watch::channel(false);
        let adapter = ChannelBusAdapter::new(bus.clone(), channel.clone());
        let router = ResponseRouter::new(&bus, client.pending().clone());
        tokio::spawn(adapter.run(shutdown_rx.clone()));
        tokio::spawn(router.run(shutdown_rx));

        Self {
            bus,
            listeners,
            channel,
            client,
            shutdown,
        }
    }

    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }
}
