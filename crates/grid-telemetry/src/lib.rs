//! # Grid Telemetry
//!
//! Logging configuration and subscriber initialisation for Grid-Bridge
//! processes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use grid_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> Result<(), grid_telemetry::TelemetryError> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     // Events from every crate are now written to stdout
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GRID_SERVICE_NAME` | `grid-bridge` | Service name |
//! | `GRID_LOG_LEVEL` | `info` | Log filter (falls back to `RUST_LOG`) |
//! | `GRID_CONSOLE_OUTPUT` | `true` | Write events to stdout |
//! | `GRID_JSON_LOGS` | `false` | JSON formatted events |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}
