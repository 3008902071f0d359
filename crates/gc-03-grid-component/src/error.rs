//! Error types for grid component initialization

use gc_01_grid_options::ConfigurationError;
use grid_types::ProducerIdentity;
use thiserror::Error;

/// Reasons a grid cannot be initialized.
///
/// Initialization is all-or-nothing: when any of these is returned no
/// listener was registered and no document was produced.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControllerError {
    #[error("invalid grid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("producer `{identity}` is not registered")]
    UnknownProducer { identity: ProducerIdentity },
}
