//! # Runtime Configuration
//!
//! Unified configuration for the channel, the bus and logging, with
//! `GRID_*` environment overrides.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GRID_FETCH_TIMEOUT_MS` | `30000` | Upper bound on one producer call |
//! | `GRID_CLIENT_TIMEOUT_MS` | `35000` | How long a client waits for a reply |
//! | `GRID_EMPTY_RESULT_POLICY` | `suppress` | `suppress` or `acknowledge` |
//! | `GRID_REQUIRE_REGISTRATION` | `false` | Reject fetches from unknown listeners |
//! | `GRID_MAX_IN_FLIGHT` | `0` | Client in-flight limit (0 = unbounded) |
//! | `GRID_BUS_CAPACITY` | `1000` | Message bus buffer per subscriber |

use gc_02_data_channel::{ChannelConfig, ConfigError, EmptyResultPolicy};
use grid_bus::DEFAULT_CHANNEL_CAPACITY;
use grid_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::warn;

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub channel: ChannelConfig,
    pub bus_capacity: usize,
    pub telemetry: TelemetryConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an arbitrary variable source.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            telemetry: TelemetryConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(ms) = parse::<u64, _>(&lookup, "GRID_FETCH_TIMEOUT_MS") {
            config.channel.fetch_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64, _>(&lookup, "GRID_CLIENT_TIMEOUT_MS") {
            config.channel.client_timeout = Duration::from_millis(ms);
        }
        if let Some(policy) = lookup("GRID_EMPTY_RESULT_POLICY") {
            match policy.to_lowercase().as_str() {
                "suppress" => config.channel.empty_result_policy = EmptyResultPolicy::Suppress,
                "acknowledge" => {
                    config.channel.empty_result_policy = EmptyResultPolicy::Acknowledge
                }
                other => warn!(value = other, "Ignoring unknown GRID_EMPTY_RESULT_POLICY"),
            }
        }
        if let Some(required) = parse::<bool, _>(&lookup, "GRID_REQUIRE_REGISTRATION") {
            config.channel.require_registration = required;
        }
        if let Some(limit) = parse::<usize, _>(&lookup, "GRID_MAX_IN_FLIGHT") {
            config.channel.max_in_flight = limit;
        }
        if let Some(capacity) = parse::<usize, _>(&lookup, "GRID_BUS_CAPACITY") {
            config.bus_capacity = capacity;
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.channel.validate()
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment value");
            None
        }
    }
}
