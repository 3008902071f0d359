//! # Grid-Bridge Runtime
//!
//! Assembles the grid subsystems into one process.
//!
//! ## Modular Structure
//!
//! - `config` - `RuntimeConfig` with `GRID_*` environment overrides
//! - `runtime` - `GridRuntime`: registries, channel, controller, client and
//!   the background tasks that connect them over the message bus
//!
//! ## Subsystems
//!
//! 1. Grid Options (gc-01) - configuration flattening and column trees
//! 2. Data Channel (gc-02) - listener registry and data-fetch protocol
//! 3. Grid Component (gc-03) - widget initialization and teardown

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod runtime;

pub use config::RuntimeConfig;
pub use runtime::{GridRuntime, RuntimeError};
