//! Ports layer for grid components.

pub mod inbound;

pub use inbound::GridLifecycleApi;
