//! Ports layer for the data-fetch channel.

pub mod inbound;
pub mod outbound;

pub use inbound::DataFetchApi;
pub use outbound::{DataProducer, ProducerResolver};
