//! Data-fetch channel configuration
//!
//! # Example
//!
//! ```ignore
//! use gc_02_data_channel::{ChannelConfig, EmptyResultPolicy};
//!
//! let config = ChannelConfig::default()
//!     .with_fetch_timeout(Duration::from_secs(5))
//!     .with_empty_result_policy(EmptyResultPolicy::Acknowledge);
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::time::Duration;
use thiserror::Error;

/// Default producer timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time a client waits for a response.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(35);

/// What the channel does when a producer has nothing to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResultPolicy {
    /// Emit nothing. The requester only learns about it through its own timeout.
    #[default]
    Suppress,
    /// Emit an explicit empty response.
    Acknowledge,
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
}

/// Channel and client settings.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Upper bound on one producer call. The call is cancelled when it elapses.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "fetch_timeout_ms")]
    pub fetch_timeout: Duration,

    /// How long a [`crate::FetchClient`] waits for a correlated reply.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "client_timeout_ms")]
    pub client_timeout: Duration,

    pub empty_result_policy: EmptyResultPolicy,

    /// Reject requests for listeners that were never registered.
    pub require_registration: bool,

    /// Outstanding fetches per client. Zero means unbounded.
    pub max_in_flight: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            client_timeout: DEFAULT_CLIENT_TIMEOUT,
            empty_result_policy: EmptyResultPolicy::Suppress,
            require_registration: false,
            max_in_flight: 0,
        }
    }
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "fetch_timeout_ms",
            });
        }
        if self.client_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "client_timeout_ms",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_client_timeout(mut self, timeout: Duration) -> Self {
        self.client_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_empty_result_policy(mut self, policy: EmptyResultPolicy) -> Self {
        self.empty_result_policy = policy;
        self
    }

    #[must_use]
    pub fn with_require_registration(mut self, require: bool) -> Self {
        self.require_registration = require;
        self
    }

    #[must_use]
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max;
        self
    }
}
