//! # Integration Tests
//!
//! - `options_flattening`: composite and column documents as the client sees them
//! - `data_channel`: request/response over the bus
//! - `grid_lifecycle`: initialization, fetch and teardown through the runtime

pub mod data_channel;
pub mod grid_lifecycle;
pub mod options_flattening;
