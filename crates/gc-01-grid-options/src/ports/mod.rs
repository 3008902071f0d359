//! Ports layer for the grid options subsystem.

pub mod outbound;

pub use outbound::ComponentReferenceRegistry;
