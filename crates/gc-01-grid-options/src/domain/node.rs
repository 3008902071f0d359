//! # Configuration Node
//!
//! A named bag of independently optional properties. Only properties that
//! hold a value are ever serialized; clearing a property (or setting it to
//! `None`) erases it from every future document.
//!
//! ```ignore
//! let mut rendering = ConfigurationNode::new();
//! rendering
//!     .set_bool("animateRows", true)
//!     .set_int("cellFlashDuration", 500);
//! ```
//!
//! Nodes are plain values. A [`SharedNode`] is the one way to make two owners
//! observe the same properties; reference cycles between shared nodes are the
//! caller's responsibility and are not detected.

use crate::error::ConfigurationError;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// RAW EXPRESSIONS
// =============================================================================

/// A pre-serialized JSON fragment that is emitted as-is.
///
/// Used for values the typed setters cannot express, such as a client-side
/// expression object. The fragment is validated once, when it is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExpression {
    source: String,
    value: Value,
}

impl RawExpression {
    /// Parse and validate a JSON fragment.
    ///
    /// `null` is rejected: an absent value is expressed by not setting the
    /// property at all.
    pub fn parse(source: impl Into<String>) -> Result<Self, ConfigurationError> {
        let source = source.into();
        let value: Value = serde_json::from_str(&source).map_err(|e| {
            ConfigurationError::InvalidRawExpression {
                reason: e.to_string(),
            }
        })?;
        if value.is_null() {
            return Err(ConfigurationError::InvalidRawExpression {
                reason: "null is not a value".to_string(),
            });
        }
        Ok(Self { source, value })
    }

    /// Wrap an already parsed value, keeping it verbatim.
    fn from_value(value: Value) -> Self {
        Self {
            source: value.to_string(),
            value,
        }
    }

    /// The fragment exactly as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The parsed fragment.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

// =============================================================================
// PROPERTY VALUES
// =============================================================================

/// A typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Number(f64),
    Text(String),
    Raw(RawExpression),
    Node(ConfigurationNode),
    Shared(SharedNode),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Whether this value has no wire form and must be treated as unset.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Number(n) if !n.is_finite())
    }

    /// Wire form of the value, or `None` when it has none.
    #[must_use]
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Bool(b) => Some(Value::Bool(*b)),
            Self::Int(i) => Some(Value::from(*i)),
            Self::Number(n) => Number::from_f64(*n).map(Value::Number),
            Self::Text(s) => Some(Value::String(s.clone())),
            Self::Raw(raw) => Some(raw.value().clone()),
            Self::Node(node) => Some(Value::Object(node.to_map())),
            Self::Shared(shared) => Some(Value::Object(shared.read().to_map())),
            Self::List(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json().unwrap_or(Value::Null))
                    .collect(),
            )),
        }
    }

    /// Convert an arbitrary JSON value. `null` has no property form.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Int(i)),
                None => n.as_f64().map(Self::Number),
            },
            Value::String(s) => Some(Self::Text(s)),
            // Null elements are positional, so such an array is kept verbatim.
            Value::Array(items) if items.iter().any(Value::is_null) => {
                Some(Self::Raw(RawExpression::from_value(Value::Array(items))))
            }
            Value::Array(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_json).collect(),
            )),
            Value::Object(map) => Some(Self::Node(ConfigurationNode::from_map(map))),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<RawExpression> for PropertyValue {
    fn from(value: RawExpression) -> Self {
        Self::Raw(value)
    }
}

impl From<ConfigurationNode> for PropertyValue {
    fn from(value: ConfigurationNode) -> Self {
        Self::Node(value)
    }
}

impl From<SharedNode> for PropertyValue {
    fn from(value: SharedNode) -> Self {
        Self::Shared(value)
    }
}

impl From<grid_types::ComponentRef> for PropertyValue {
    fn from(value: grid_types::ComponentRef) -> Self {
        Self::Text(value.into_inner())
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// CONFIGURATION NODE
// =============================================================================

/// Ordered set of optional properties keyed by wire name.
///
/// Setting an existing key replaces its value in place, so a document's key
/// order is the order in which keys were first set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationNode {
    properties: Vec<(String, PropertyValue)>,
}

impl ConfigurationNode {
    /// Create an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a node from a JSON object, dropping `null` members.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut node = Self::new();
        for (key, value) in map {
            node.set_opt(key, PropertyValue::from_json(value));
        }
        node
    }

    /// Set a property. Values with no wire form erase the property.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if value.is_absent() {
            return self.clear(&key);
        }
        match self.position(&key) {
            Some(index) => self.properties[index].1 = value,
            None => self.properties.push((key, value)),
        }
        self
    }

    /// Set a property when `Some`, erase it when `None`.
    pub fn set_opt<V: Into<PropertyValue>>(
        &mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> &mut Self {
        match value {
            Some(v) => self.set(key, v),
            None => {
                let key = key.into();
                self.clear(&key)
            }
        }
    }

    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.set(key, PropertyValue::Bool(value))
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.set(key, PropertyValue::Int(value))
    }

    /// Set a floating point property. NaN and infinities erase the property.
    pub fn set_number(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.set(key, PropertyValue::Number(value))
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set(key, PropertyValue::Text(value.into()))
    }

    pub fn set_raw(&mut self, key: impl Into<String>, value: RawExpression) -> &mut Self {
        self.set(key, PropertyValue::Raw(value))
    }

    /// Nest a node under a key. The nested node is copied.
    pub fn set_node(&mut self, key: impl Into<String>, value: ConfigurationNode) -> &mut Self {
        self.set(key, PropertyValue::Node(value))
    }

    pub fn set_list<T: Into<PropertyValue>>(
        &mut self,
        key: impl Into<String>,
        values: Vec<T>,
    ) -> &mut Self {
        self.set(key, PropertyValue::from(values))
    }

    /// Builder-style variant of [`Self::set`] for constructing nodes inline.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Erase a property.
    pub fn clear(&mut self, key: &str) -> &mut Self {
        if let Some(index) = self.position(key) {
            self.properties.remove(index);
        }
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.position(key).map(|index| &self.properties[index].1)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Keys of all set properties, in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(key, _)| key.as_str())
    }

    /// Set properties, in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Copy every property of `other` into this node, overriding equal keys.
    pub fn merge_from(&mut self, other: &ConfigurationNode) -> &mut Self {
        for (key, value) in &other.properties {
            self.set(key.clone(), value.clone());
        }
        self
    }

    /// The node as a JSON object. Properties without a wire form are skipped.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in &self.properties {
            if let Some(json) = value.to_json() {
                map.insert(key.clone(), json);
            }
        }
        map
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.properties.iter().position(|(k, _)| k == key)
    }
}

impl Serialize for ConfigurationNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

// =============================================================================
// SHARED NODES
// =============================================================================

/// A node owned jointly by several configurations.
///
/// Every holder observes every write. Cloning a `SharedNode` clones the handle,
/// not the properties; use [`SharedNode::snapshot`] for an independent copy.
#[derive(Clone, Default)]
pub struct SharedNode(Arc<RwLock<ConfigurationNode>>);

impl SharedNode {
    #[must_use]
    pub fn new(node: ConfigurationNode) -> Self {
        Self(Arc::new(RwLock::new(node)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ConfigurationNode> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ConfigurationNode> {
        self.0.write()
    }

    /// Independent copy of the current properties.
    #[must_use]
    pub fn snapshot(&self) -> ConfigurationNode {
        self.0.read().clone()
    }

    /// Whether both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &SharedNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<ConfigurationNode> for SharedNode {
    fn from(node: ConfigurationNode) -> Self {
        Self::new(node)
    }
}

impl PartialEq for SharedNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.read() == *other.read()
    }
}

impl fmt::Debug for SharedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedNode").field(&*self.read()).finish()
    }
}
