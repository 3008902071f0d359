//! Adapters for the grid options subsystem.

pub mod component_registry;

pub use component_registry::InMemoryComponentRegistry;
