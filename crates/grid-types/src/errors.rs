//! # Error Types
//!
//! Errors raised while constructing shared identifiers.

use thiserror::Error;

/// Errors that can occur when building an identifier from caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The identifier was empty or whitespace only.
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },

    /// The identifier contained control characters.
    #[error("{kind} contains control characters: {value:?}")]
    ControlCharacters { kind: &'static str, value: String },
}
