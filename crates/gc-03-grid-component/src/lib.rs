//! # GC-03 Grid Component
//!
//! Widget-initialization orchestration for a client-rendered data grid.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌───────────────────────────┐
//! GridComponent ─→│  GridComponentController  │─→ GridInitialization
//!                 └──┬──────────────┬─────────┘      └─ to_client_document()
//!                    │              │
//!                    ▼              ▼
//!     ComponentReferenceRegistry   ListenerRegistry
//!            (gc-01)                 (gc-02)
//! ```
//!
//! - **Domain Layer** (`domain/`)
//!   - `GridComponent`: widget id, options and producer identity
//!   - `GridInitialization`: everything produced by one initialization
//!
//! - **Ports Layer** (`ports/`)
//!   - `GridLifecycleApi`: `initialize` and `teardown`
//!
//! - **Service Layer** (`service/`)
//!   - `GridComponentController`
//!
//! ## Invariants
//!
//! - A structurally invalid column tree aborts initialization before any
//!   registration happens; no partial document is produced.
//! - Initializing the same widget twice creates one listener registration.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use domain::{GridComponent, GridInitialization};
pub use error::ControllerError;
pub use ports::GridLifecycleApi;
pub use service::GridComponentController;
