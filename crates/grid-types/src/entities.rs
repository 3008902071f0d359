//! # Core Identifiers
//!
//! String-backed identifiers used across the workspace:
//!
//! - [`WidgetId`]: stable id of one client-rendered grid instance
//! - [`ListenerId`]: data-channel key derived from a widget id
//! - [`ProducerIdentity`]: name under which a data producer is registered
//! - [`ComponentRef`]: opaque reference to a client renderer/header component

use crate::errors::IdentityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix prepended to a widget id to form its listener id.
pub const LISTENER_PREFIX: &str = "grid-";

fn validate(kind: &'static str, value: &str) -> Result<(), IdentityError> {
    if value.trim().is_empty() {
        return Err(IdentityError::Empty { kind });
    }
    if value.chars().any(char::is_control) {
        return Err(IdentityError::ControlCharacters {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create from caller input, rejecting empty or control-character values.
            pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
                let value = value.into();
                validate($kind, &value)?;
                Ok(Self(value))
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdentityError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentityError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// Stable identifier of one grid widget instance.
    WidgetId,
    "widget id"
);

string_id!(
    /// Correlation key for a widget's data-fetch requests and responses.
    ListenerId,
    "listener id"
);

string_id!(
    /// Name of a registered data producer.
    ProducerIdentity,
    "producer identity"
);

string_id!(
    /// Opaque reference to a client-side renderer or header component.
    ComponentRef,
    "component reference"
);

impl WidgetId {
    /// Generate a fresh random widget id (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl ListenerId {
    /// Derive the listener id for a widget.
    ///
    /// The same widget id always yields the same listener id, so a widget
    /// that initializes twice maps onto one registration.
    #[must_use]
    pub fn for_widget(widget: &WidgetId) -> Self {
        Self(format!("{LISTENER_PREFIX}{}", widget.as_str()))
    }
}
