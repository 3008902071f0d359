//! Service layer for grid components.

pub mod controller;

pub use controller::GridComponentController;
