//! Adapters for the data-fetch channel.

pub mod bus_adapter;
pub mod fn_producer;
pub mod producer_registry;

pub use bus_adapter::ChannelBusAdapter;
pub use fn_producer::FnProducer;
pub use producer_registry::{ProducerFactory, ProducerRegistry, ProducerScope};
