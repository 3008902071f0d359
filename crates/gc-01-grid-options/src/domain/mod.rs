//! Domain layer for the grid options subsystem.
//!
//! Pure data transformation; no I/O.

pub mod columns;
pub mod composite;
pub mod node;
pub mod visitor;

pub use columns::{
    ColumnDefinition, ColumnDefinitionBuilder, ColumnGroup, ComponentRole, LeafColumn, Pinned,
};
pub use composite::{
    ColumnDocument, CompositeConfiguration, DefaultColumnSource, MergeSource, OverriddenKey,
};
pub use node::{ConfigurationNode, PropertyValue, RawExpression, SharedNode};
pub use visitor::{
    register_component_references, walk_columns, ColumnVisitor, ComponentReferenceCollector,
};
