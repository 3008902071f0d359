//! # Composite Configuration
//!
//! Aggregates named configuration slots into one flat options document.
//!
//! ## Merge order
//!
//! ```text
//! slot[0] ─┐
//! slot[1] ─┼─→ accumulate key -> value ─→ top-level scalars ─→ flat document
//! slot[n] ─┘   (later overrides earlier)   (merged last, win)
//! ```
//!
//! Slots are merged in registration order. Top-level scalars are merged last,
//! so they override any slot. Overrides are silent in the document; they are
//! reported by [`CompositeConfiguration::overridden_keys`] and logged at debug
//! level during serialization.
//!
//! Columns and the default column definition are not part of the flat
//! document. They serialize separately through
//! [`CompositeConfiguration::serialize_columns`].

use crate::domain::columns::ColumnDefinition;
use crate::domain::node::{ConfigurationNode, PropertyValue, SharedNode};
use crate::domain::visitor::{register_component_references, walk_columns, ColumnVisitor};
use crate::error::ConfigurationError;
use crate::ports::ComponentReferenceRegistry;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Where a flattened key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeSource {
    Slot(String),
    TopLevel,
}

impl fmt::Display for MergeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(name) => write!(f, "slot `{name}`"),
            Self::TopLevel => f.write_str("top-level"),
        }
    }
}

/// A key defined by more than one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverriddenKey {
    pub key: String,
    /// Every source that defined the key, in merge order.
    pub sources: Vec<MergeSource>,
}

impl OverriddenKey {
    /// The source whose value ends up in the document.
    #[must_use]
    pub fn winner(&self) -> Option<&MergeSource> {
        self.sources.last()
    }
}

/// Whether the default column definition was supplied or generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DefaultColumnSource {
    Explicit,
    Generated,
}

/// Serialized column state of a composite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDocument {
    pub column_defs: Vec<Value>,
    pub default_col_def: Value,
    pub default_col_def_source: DefaultColumnSource,
}

impl ColumnDocument {
    /// Whether the client should bind to the generated default.
    #[must_use]
    pub fn uses_generated_default(&self) -> bool {
        self.default_col_def_source == DefaultColumnSource::Generated
    }
}

/// One widget's complete configuration.
///
/// Cloning copies every slot node. Sharing a node between composites takes an
/// explicit [`CompositeConfiguration::register_slot`] with a [`SharedNode`].
#[derive(Debug, Default)]
pub struct CompositeConfiguration {
    slots: Vec<(String, SharedNode)>,
    top_level: ConfigurationNode,
    columns: Vec<ColumnDefinition>,
    default_column_definition: Option<ColumnDefinition>,
}

impl Clone for CompositeConfiguration {
    fn clone(&self) -> Self {
        Self {
            slots: self
                .slots
                .iter()
                .map(|(name, node)| (name.clone(), SharedNode::new(node.snapshot())))
                .collect(),
            top_level: self.top_level.clone(),
            columns: self.columns.clone(),
            default_column_definition: self.default_column_definition.clone(),
        }
    }
}

impl CompositeConfiguration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // SLOTS
    // =========================================================================

    /// Register a slot.
    ///
    /// Passing a [`SharedNode`] shares it; passing a [`ConfigurationNode`]
    /// moves it in. Re-registering a name replaces the node but keeps the
    /// slot's original merge position.
    pub fn register_slot(&mut self, name: impl Into<String>, node: impl Into<SharedNode>) -> &mut Self {
        let name = name.into();
        let node = node.into();
        match self.slots.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = node,
            None => self.slots.push((name, node)),
        }
        self
    }

    /// Builder-style variant of [`Self::register_slot`].
    #[must_use]
    pub fn with_slot(mut self, name: impl Into<String>, node: impl Into<SharedNode>) -> Self {
        self.register_slot(name, node);
        self
    }

    /// Handle to a slot, created empty on first access.
    pub fn slot(&mut self, name: &str) -> SharedNode {
        if let Some((_, node)) = self.slots.iter().find(|(existing, _)| existing == name) {
            return node.clone();
        }
        let node = SharedNode::default();
        self.slots.push((name.to_string(), node.clone()));
        node
    }

    /// Mutate a slot in place, creating it if needed.
    pub fn configure_slot<F>(&mut self, name: &str, configure: F) -> &mut Self
    where
        F: FnOnce(&mut ConfigurationNode),
    {
        let slot = self.slot(name);
        configure(&mut *slot.write());
        self
    }

    /// Handle to an existing slot.
    #[must_use]
    pub fn get_slot(&self, name: &str) -> Option<SharedNode> {
        self.slots
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, node)| node.clone())
    }

    /// Slot names in merge order.
    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(name, _)| name.as_str())
    }

    // =========================================================================
    // TOP-LEVEL SCALARS
    // =========================================================================

    /// Set a top-level property. Top-level properties override every slot.
    pub fn set_top_level(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> &mut Self {
        self.top_level.set(key, value);
        self
    }

    pub fn clear_top_level(&mut self, key: &str) -> &mut Self {
        self.top_level.clear(key);
        self
    }

    #[must_use]
    pub fn top_level(&self) -> &ConfigurationNode {
        &self.top_level
    }

    pub fn top_level_mut(&mut self) -> &mut ConfigurationNode {
        &mut self.top_level
    }

    // =========================================================================
    // FLATTENING
    // =========================================================================

    /// The flat options document.
    #[must_use]
    pub fn serialize(&self) -> Map<String, Value> {
        let (document, overridden) = self.merge();
        for entry in &overridden {
            debug!(
                key = %entry.key,
                winner = %entry.winner().map(ToString::to_string).unwrap_or_default(),
                sources = entry.sources.len(),
                "Configuration key overridden"
            );
        }
        document
    }

    /// The flat options document as a compact JSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.serialize())
    }

    /// Keys defined by more than one source, in first-definition order.
    #[must_use]
    pub fn overridden_keys(&self) -> Vec<OverriddenKey> {
        self.merge().1
    }

    fn merge(&self) -> (Map<String, Value>, Vec<OverriddenKey>) {
        let mut document = Map::new();
        let mut sources: Vec<(String, Vec<MergeSource>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        let mut write = |node: &ConfigurationNode, source: MergeSource| {
            for (key, value) in node.iter() {
                let Some(json) = value.to_json() else {
                    continue;
                };
                document.insert(key.to_string(), json);
                match index.get(key) {
                    Some(&i) => sources[i].1.push(source.clone()),
                    None => {
                        index.insert(key.to_string(), sources.len());
                        sources.push((key.to_string(), vec![source.clone()]));
                    }
                }
            }
        };

        for (name, slot) in &self.slots {
            write(&*slot.read(), MergeSource::Slot(name.clone()));
        }
        write(&self.top_level, MergeSource::TopLevel);

        let overridden = sources
            .into_iter()
            .filter(|(_, sources)| sources.len() > 1)
            .map(|(key, sources)| OverriddenKey { key, sources })
            .collect();

        (document, overridden)
    }

    // =========================================================================
    // COLUMNS
    // =========================================================================

    /// Append a column. Validation happens when columns are serialized.
    pub fn add_column(&mut self, column: ColumnDefinition) -> &mut Self {
        self.columns.push(column);
        self
    }

    /// Append a column group over `children`.
    pub fn add_group(&mut self, children: Vec<ColumnDefinition>) -> Result<&mut Self, ConfigurationError> {
        let group = ColumnDefinition::group(children)?;
        self.columns.push(group);
        Ok(self)
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Depth-first walk over the attached columns. The default definition is
    /// not part of the tree.
    pub fn walk(&self, visitor: &mut dyn ColumnVisitor) {
        walk_columns(&self.columns, visitor);
    }

    pub fn set_default_column_definition(&mut self, column: ColumnDefinition) -> &mut Self {
        self.default_column_definition = Some(column);
        self
    }

    pub fn clear_default_column_definition(&mut self) -> &mut Self {
        self.default_column_definition = None;
        self
    }

    /// Copy of the effective default column definition.
    ///
    /// Mutating the copy does not affect this configuration; use
    /// [`Self::set_default_column_definition`] to change it.
    #[must_use]
    pub fn default_column_definition(&self) -> ColumnDefinition {
        self.default_column_definition
            .clone()
            .unwrap_or_else(ColumnDefinition::generated_default)
    }

    #[must_use]
    pub fn has_explicit_default_column_definition(&self) -> bool {
        self.default_column_definition.is_some()
    }

    /// Validate the whole column tree, including the default definition.
    pub fn validate_columns(&self) -> Result<(), ConfigurationError> {
        let mut path = Vec::new();
        for (index, column) in self.columns.iter().enumerate() {
            path.push(index);
            column.validate_at(&mut path)?;
            path.pop();
        }
        if let Some(default) = &self.default_column_definition {
            if default.is_group() {
                return Err(ConfigurationError::invalid_document(
                    "defaultColDef",
                    "the default column definition cannot be a group",
                ));
            }
            default.validate()?;
        }
        Ok(())
    }

    /// Validate and serialize the column tree and the default definition.
    pub fn serialize_columns(&self) -> Result<ColumnDocument, ConfigurationError> {
        self.validate_columns()?;

        let (default_col_def, default_col_def_source) = match &self.default_column_definition {
            Some(explicit) => (explicit.to_value(), DefaultColumnSource::Explicit),
            None => (
                ColumnDefinition::generated_default().to_value(),
                DefaultColumnSource::Generated,
            ),
        };

        Ok(ColumnDocument {
            column_defs: self.columns.iter().map(ColumnDefinition::to_value).collect(),
            default_col_def,
            default_col_def_source,
        })
    }

    /// Register every component reference carried by the columns and the
    /// explicit default definition. Returns the number of new references.
    pub fn register_component_references(
        &self,
        registry: &dyn ComponentReferenceRegistry,
    ) -> Result<usize, ConfigurationError> {
        self.validate_columns()?;
        let mut registered = register_component_references(&self.columns, registry);
        if let Some(default) = &self.default_column_definition {
            registered += register_component_references(std::slice::from_ref(default), registry);
        }
        Ok(registered)
    }
}
