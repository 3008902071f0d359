//! # GC-01 Grid Options
//!
//! Configuration composition and flattening for a client-rendered data grid.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure data transformation
//!   - `ConfigurationNode`: bag of independently optional properties
//!   - `CompositeConfiguration`: ordered slots flattened into one document
//!   - `ColumnDefinition`: recursive leaf/group column tree
//!   - `walk_columns`: depth-first visitor over the tree
//!
//! - **Ports Layer** (`ports/`)
//!   - `ComponentReferenceRegistry`: driven port notified of renderer and
//!     header component references
//!
//! - **Adapters Layer** (`adapters/`)
//!   - `InMemoryComponentRegistry`
//!
//! ## Invariants
//!
//! - A property that holds no value never appears in a serialized document.
//! - When two sources define the same key, the later one in merge order wins;
//!   top-level scalars are merged after every slot.
//! - A column node is either a leaf or a non-empty group, never both.
//!
//! ## Usage Example
//!
//! ```ignore
//! use gc_01_grid_options::{ColumnDefinition, CompositeConfiguration};
//!
//! let mut options = CompositeConfiguration::new();
//! options.configure_slot("pagination", |node| {
//!     node.set_bool("pagination", true).set_int("paginationPageSize", 50);
//! });
//! options.add_column(ColumnDefinition::leaf("name"));
//!
//! let document = options.serialize();
//! let columns = options.serialize_columns()?;
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use adapters::InMemoryComponentRegistry;
pub use domain::{
    register_component_references, walk_columns, ColumnDefinition, ColumnDefinitionBuilder,
    ColumnDocument, ColumnGroup, ColumnVisitor, ComponentReferenceCollector, ComponentRole,
    CompositeConfiguration, ConfigurationNode, DefaultColumnSource, LeafColumn, MergeSource,
    OverriddenKey, Pinned, PropertyValue, RawExpression, SharedNode,
};
pub use error::ConfigurationError;
pub use ports::ComponentReferenceRegistry;
