//! Driving port: grid widget lifecycle.

use crate::domain::{GridComponent, GridInitialization};
use crate::error::ControllerError;

/// Lifecycle operations for grid widgets.
pub trait GridLifecycleApi: Send + Sync {
    /// Build the client document for `grid` and open its data channel.
    fn initialize(&self, grid: &GridComponent) -> Result<GridInitialization, ControllerError>;

    /// Close the data channel of `grid`. Returns whether it was open.
    fn teardown(&self, grid: &GridComponent) -> bool;
}
