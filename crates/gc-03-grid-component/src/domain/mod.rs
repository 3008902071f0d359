//! Domain layer for grid components.

pub mod component;
pub mod initialization;

pub use component::GridComponent;
pub use initialization::GridInitialization;
