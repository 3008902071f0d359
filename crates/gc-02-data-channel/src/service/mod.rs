//! Service layer for the data-fetch channel.

pub mod channel;

pub use channel::DataFetchChannel;
