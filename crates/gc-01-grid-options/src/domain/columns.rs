//! # Column Definitions
//!
//! Recursive description of the grid's columns. Every node is exactly one of:
//!
//! - a **leaf column**: field binding, header text, display flags and optional
//!   renderer/header component references;
//! - a **column group**: a non-empty ordered list of children plus
//!   group-display flags, and no field or component binding.
//!
//! ```text
//! [ {field: "name"},
//!   {headerName: "Totals", children: [ {field: "a"}, {field: "b"} ]} ]
//! ```
//!
//! A group that also carries a field or component binding is rejected with a
//! [`ConfigurationError`], both when built through [`ColumnDefinitionBuilder`]
//! and when parsed from the wire form with [`ColumnDefinition::from_value`].

use crate::domain::node::{ConfigurationNode, PropertyValue};
use crate::error::{describe_path, ConfigurationError};
use grid_types::ComponentRef;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

// Wire keys.
const FIELD: &str = "field";
const HEADER_NAME: &str = "headerName";
const SORTABLE: &str = "sortable";
const FILTER: &str = "filter";
const RESIZABLE: &str = "resizable";
const HIDE: &str = "hide";
const PINNED: &str = "pinned";
const WIDTH: &str = "width";
const FLEX: &str = "flex";
const CELL_RENDERER: &str = "cellRenderer";
const HEADER_COMPONENT: &str = "headerComponent";
const HEADER_COMPONENT_PARAMS: &str = "headerComponentParams";
const INNER_HEADER_COMPONENT: &str = "innerHeaderComponent";
const CHILDREN: &str = "children";
const GROUP_ID: &str = "groupId";
const MARRY_CHILDREN: &str = "marryChildren";
const OPEN_BY_DEFAULT: &str = "openByDefault";

/// Which slot of a leaf column a component reference occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentRole {
    CellRenderer,
    HeaderComponent,
    InnerHeaderComponent,
}

impl ComponentRole {
    /// Wire key the reference is emitted under.
    #[must_use]
    pub fn wire_key(self) -> &'static str {
        match self {
            Self::CellRenderer => CELL_RENDERER,
            Self::HeaderComponent => HEADER_COMPONENT,
            Self::InnerHeaderComponent => INNER_HEADER_COMPONENT,
        }
    }
}

/// Side a column is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pinned {
    Left,
    Right,
}

impl Pinned {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

// =============================================================================
// LEAF COLUMNS AND GROUPS
// =============================================================================

/// A displayable column bound to one field of the row data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafColumn {
    pub field: Option<String>,
    pub header_name: Option<String>,
    pub sortable: Option<bool>,
    pub filter: Option<bool>,
    pub resizable: Option<bool>,
    pub hide: Option<bool>,
    pub pinned: Option<Pinned>,
    pub width: Option<u32>,
    pub flex: Option<u32>,
    pub cell_renderer: Option<ComponentRef>,
    pub header_component: Option<ComponentRef>,
    pub inner_header_component: Option<ComponentRef>,
    /// Opaque properties emitted alongside the typed ones. Typed fields win
    /// when both define the same key.
    pub extra: ConfigurationNode,
}

impl LeafColumn {
    /// Component references carried by this column, in wire order.
    pub fn component_refs(&self) -> impl Iterator<Item = (ComponentRole, &ComponentRef)> {
        [
            (ComponentRole::CellRenderer, self.cell_renderer.as_ref()),
            (ComponentRole::HeaderComponent, self.header_component.as_ref()),
            (
                ComponentRole::InnerHeaderComponent,
                self.inner_header_component.as_ref(),
            ),
        ]
        .into_iter()
        .filter_map(|(role, reference)| reference.map(|r| (role, r)))
    }

    fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        put(&mut map, FIELD, self.field.clone().map(Value::String));
        put(&mut map, HEADER_NAME, self.header_name.clone().map(Value::String));
        put(&mut map, SORTABLE, self.sortable.map(Value::Bool));
        put(&mut map, FILTER, self.filter.map(Value::Bool));
        put(&mut map, RESIZABLE, self.resizable.map(Value::Bool));
        put(&mut map, HIDE, self.hide.map(Value::Bool));
        put(&mut map, PINNED, self.pinned.map(|p| Value::from(p.as_str())));
        put(&mut map, WIDTH, self.width.map(Value::from));
        put(&mut map, FLEX, self.flex.map(Value::from));
        put(&mut map, CELL_RENDERER, ref_value(&self.cell_renderer));
        put(&mut map, HEADER_COMPONENT, ref_value(&self.header_component));

        if let Some(inner) = &self.inner_header_component {
            let mut params = match self.extra.get(HEADER_COMPONENT_PARAMS) {
                Some(PropertyValue::Node(node)) => node.to_map(),
                _ => Map::new(),
            };
            params.insert(
                INNER_HEADER_COMPONENT.to_string(),
                Value::from(inner.as_str()),
            );
            map.insert(HEADER_COMPONENT_PARAMS.to_string(), Value::Object(params));
        }

        append_extra(&mut map, &self.extra);
        map
    }
}

/// A set of columns displayed under a shared header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnGroup {
    pub header_name: Option<String>,
    pub group_id: Option<String>,
    pub marry_children: Option<bool>,
    pub open_by_default: Option<bool>,
    pub children: Vec<ColumnDefinition>,
    pub extra: ConfigurationNode,
}

impl ColumnGroup {
    fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        put(&mut map, HEADER_NAME, self.header_name.clone().map(Value::String));
        put(&mut map, GROUP_ID, self.group_id.clone().map(Value::String));
        put(&mut map, MARRY_CHILDREN, self.marry_children.map(Value::Bool));
        put(&mut map, OPEN_BY_DEFAULT, self.open_by_default.map(Value::Bool));
        map.insert(
            CHILDREN.to_string(),
            Value::Array(self.children.iter().map(ColumnDefinition::to_value).collect()),
        );
        append_extra(&mut map, &self.extra);
        map
    }
}

fn put(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

fn ref_value(reference: &Option<ComponentRef>) -> Option<Value> {
    reference.as_ref().map(|r| Value::from(r.as_str()))
}

fn append_extra(map: &mut Map<String, Value>, extra: &ConfigurationNode) {
    for (key, value) in extra.iter() {
        if map.contains_key(key) {
            continue;
        }
        if let Some(json) = value.to_json() {
            map.insert(key.to_string(), json);
        }
    }
}

// =============================================================================
// COLUMN DEFINITION
// =============================================================================

/// One node of the column tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefinition {
    Leaf(LeafColumn),
    Group(ColumnGroup),
}

impl ColumnDefinition {
    /// Leaf column bound to `field`.
    #[must_use]
    pub fn leaf(field: impl Into<String>) -> Self {
        Self::Leaf(LeafColumn {
            field: Some(field.into()),
            ..LeafColumn::default()
        })
    }

    /// Column group over `children`. Fails if the group or any child is invalid.
    pub fn group(children: Vec<ColumnDefinition>) -> Result<Self, ConfigurationError> {
        ColumnDefinitionBuilder::new().children(children).build()
    }

    #[must_use]
    pub fn builder() -> ColumnDefinitionBuilder {
        ColumnDefinitionBuilder::new()
    }

    /// Built-in default applied when no default column definition is set.
    #[must_use]
    pub fn generated_default() -> Self {
        Self::Leaf(LeafColumn {
            sortable: Some(true),
            filter: Some(true),
            resizable: Some(true),
            ..LeafColumn::default()
        })
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// Validate this node and its whole subtree.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.validate_at(&mut Vec::new())
    }

    pub(crate) fn validate_at(&self, path: &mut Vec<usize>) -> Result<(), ConfigurationError> {
        match self {
            Self::Leaf(leaf) => {
                if leaf.extra.contains(CHILDREN) {
                    return Err(match &leaf.field {
                        Some(field) => ConfigurationError::GroupWithFieldBinding {
                            path: describe_path(path),
                            field: field.clone(),
                        },
                        None => ConfigurationError::invalid_document(
                            &describe_path(path),
                            "children must be declared through a column group",
                        ),
                    });
                }
                if let Some(key) = untyped_component_key(&leaf.extra) {
                    return Err(ConfigurationError::invalid_document(
                        &describe_path(path),
                        format!("`{key}` must be set through its component field"),
                    ));
                }
                Ok(())
            }
            Self::Group(group) => {
                check_group_bindings(&group.extra, path)?;
                if group.children.is_empty() {
                    return Err(ConfigurationError::EmptyGroup {
                        path: describe_path(path),
                    });
                }
                for (index, child) in group.children.iter().enumerate() {
                    path.push(index);
                    child.validate_at(path)?;
                    path.pop();
                }
                Ok(())
            }
        }
    }

    /// Wire form of this node.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Leaf(leaf) => Value::Object(leaf.to_map()),
            Self::Group(group) => Value::Object(group.to_map()),
        }
    }

    /// Parse and validate a node from its wire form.
    pub fn from_value(value: &Value) -> Result<Self, ConfigurationError> {
        parse_at(value, &mut Vec::new())
    }

    /// Parse and validate a whole column document (a JSON array).
    pub fn list_from_value(value: &Value) -> Result<Vec<Self>, ConfigurationError> {
        let items = value.as_array().ok_or_else(|| {
            ConfigurationError::invalid_document(&describe_path(&[]), "expected an array")
        })?;
        let mut path = Vec::new();
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                path.push(index);
                let parsed = parse_at(item, &mut path);
                path.pop();
                parsed
            })
            .collect()
    }
}

impl Serialize for ColumnDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn check_group_bindings(
    extra: &ConfigurationNode,
    path: &[usize],
) -> Result<(), ConfigurationError> {
    if let Some(field) = extra.get(FIELD) {
        return Err(ConfigurationError::GroupWithFieldBinding {
            path: describe_path(path),
            field: display_property(field),
        });
    }
    for key in [CELL_RENDERER, HEADER_COMPONENT] {
        if let Some(component) = extra.get(key) {
            return Err(ConfigurationError::GroupWithRendererBinding {
                path: describe_path(path),
                component: display_property(component),
            });
        }
    }
    if let Some(PropertyValue::Node(params)) = extra.get(HEADER_COMPONENT_PARAMS) {
        if let Some(component) = params.get(INNER_HEADER_COMPONENT) {
            return Err(ConfigurationError::GroupWithRendererBinding {
                path: describe_path(path),
                component: display_property(component),
            });
        }
    }
    Ok(())
}

/// Component keys left in a leaf's opaque properties, where the reference
/// walk would never see them.
fn untyped_component_key(extra: &ConfigurationNode) -> Option<&'static str> {
    for key in [CELL_RENDERER, HEADER_COMPONENT] {
        if extra.contains(key) {
            return Some(key);
        }
    }
    match extra.get(HEADER_COMPONENT_PARAMS) {
        Some(PropertyValue::Node(params)) if params.contains(INNER_HEADER_COMPONENT) => {
            Some(INNER_HEADER_COMPONENT)
        }
        _ => None,
    }
}

/// Move component references given as opaque properties into the typed
/// fields. A typed field already set wins.
fn promote_component_refs(leaf: &mut LeafColumn, here: &str) -> Result<(), ConfigurationError> {
    for (key, slot) in [
        (CELL_RENDERER, &mut leaf.cell_renderer),
        (HEADER_COMPONENT, &mut leaf.header_component),
    ] {
        if let Some(value) = leaf.extra.get(key).and_then(PropertyValue::to_json) {
            let reference = component(&value, key, here)?;
            slot.get_or_insert(reference);
            leaf.extra.clear(key);
        }
    }

    let mut params = match leaf.extra.get(HEADER_COMPONENT_PARAMS) {
        Some(PropertyValue::Node(params)) if params.contains(INNER_HEADER_COMPONENT) => params.clone(),
        _ => return Ok(()),
    };
    if let Some(inner) = params.get(INNER_HEADER_COMPONENT).and_then(PropertyValue::to_json) {
        let reference = component(&inner, INNER_HEADER_COMPONENT, here)?;
        leaf.inner_header_component.get_or_insert(reference);
    }
    params.clear(INNER_HEADER_COMPONENT);
    if params.is_empty() {
        leaf.extra.clear(HEADER_COMPONENT_PARAMS);
    } else {
        leaf.extra.set_node(HEADER_COMPONENT_PARAMS, params);
    }
    Ok(())
}

fn display_property(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Text(text) => text.clone(),
        other => other.to_json().map(|v| v.to_string()).unwrap_or_default(),
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Fluent builder that validates on [`ColumnDefinitionBuilder::build`].
///
/// Setting `children` makes the result a group; leaf display flags given to a
/// group are passed through as opaque properties.
#[derive(Debug, Clone, Default)]
pub struct ColumnDefinitionBuilder {
    leaf: LeafColumn,
    children: Option<Vec<ColumnDefinition>>,
    group_id: Option<String>,
    marry_children: Option<bool>,
    open_by_default: Option<bool>,
}

impl ColumnDefinitionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.leaf.field = Some(field.into());
        self
    }

    #[must_use]
    pub fn header_name(mut self, header_name: impl Into<String>) -> Self {
        self.leaf.header_name = Some(header_name.into());
        self
    }

    #[must_use]
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.leaf.sortable = Some(sortable);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: bool) -> Self {
        self.leaf.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn resizable(mut self, resizable: bool) -> Self {
        self.leaf.resizable = Some(resizable);
        self
    }

    #[must_use]
    pub fn hide(mut self, hide: bool) -> Self {
        self.leaf.hide = Some(hide);
        self
    }

    #[must_use]
    pub fn pinned(mut self, pinned: Pinned) -> Self {
        self.leaf.pinned = Some(pinned);
        self
    }

    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.leaf.width = Some(width);
        self
    }

    #[must_use]
    pub fn flex(mut self, flex: u32) -> Self {
        self.leaf.flex = Some(flex);
        self
    }

    #[must_use]
    pub fn cell_renderer(mut self, component: ComponentRef) -> Self {
        self.leaf.cell_renderer = Some(component);
        self
    }

    #[must_use]
    pub fn header_component(mut self, component: ComponentRef) -> Self {
        self.leaf.header_component = Some(component);
        self
    }

    #[must_use]
    pub fn inner_header_component(mut self, component: ComponentRef) -> Self {
        self.leaf.inner_header_component = Some(component);
        self
    }

    #[must_use]
    pub fn children(mut self, children: Vec<ColumnDefinition>) -> Self {
        self.children = Some(children);
        self
    }

    #[must_use]
    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    #[must_use]
    pub fn marry_children(mut self, marry: bool) -> Self {
        self.marry_children = Some(marry);
        self
    }

    #[must_use]
    pub fn open_by_default(mut self, open: bool) -> Self {
        self.open_by_default = Some(open);
        self
    }

    /// Attach an opaque property.
    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.leaf.extra.set(key, value);
        self
    }

    /// Build and validate the node.
    pub fn build(self) -> Result<ColumnDefinition, ConfigurationError> {
        let Self {
            leaf,
            children,
            group_id,
            marry_children,
            open_by_default,
        } = self;

        let definition = match children {
            None => {
                let mut leaf = leaf;
                promote_component_refs(&mut leaf, &describe_path(&[]))?;
                leaf.extra
                    .set_opt(GROUP_ID, group_id)
                    .set_opt(MARRY_CHILDREN, marry_children)
                    .set_opt(OPEN_BY_DEFAULT, open_by_default);
                ColumnDefinition::Leaf(leaf)
            }
            Some(children) => {
                let path = describe_path(&[]);
                if let Some(field) = &leaf.field {
                    return Err(ConfigurationError::GroupWithFieldBinding {
                        path,
                        field: field.clone(),
                    });
                }
                if let Some((_, component)) = leaf.component_refs().next() {
                    return Err(ConfigurationError::GroupWithRendererBinding {
                        path,
                        component: component.to_string(),
                    });
                }

                let mut extra = leaf.extra;
                extra
                    .set_opt(SORTABLE, leaf.sortable)
                    .set_opt(FILTER, leaf.filter)
                    .set_opt(RESIZABLE, leaf.resizable)
                    .set_opt(HIDE, leaf.hide)
                    .set_opt(PINNED, leaf.pinned.map(Pinned::as_str))
                    .set_opt(WIDTH, leaf.width)
                    .set_opt(FLEX, leaf.flex);

                ColumnDefinition::Group(ColumnGroup {
                    header_name: leaf.header_name,
                    group_id,
                    marry_children,
                    open_by_default,
                    children,
                    extra,
                })
            }
        };

        definition.validate()?;
        Ok(definition)
    }
}

// =============================================================================
// WIRE PARSING
// =============================================================================

fn parse_at(value: &Value, path: &mut Vec<usize>) -> Result<ColumnDefinition, ConfigurationError> {
    let object = value
        .as_object()
        .ok_or_else(|| ConfigurationError::invalid_document(&describe_path(path), "expected an object"))?;

    match object.get(CHILDREN) {
        Some(children) if !children.is_null() => parse_group(object, children, path),
        _ => parse_leaf(object, path),
    }
}

fn parse_leaf(
    object: &Map<String, Value>,
    path: &[usize],
) -> Result<ColumnDefinition, ConfigurationError> {
    let here = describe_path(path);
    let mut leaf = LeafColumn::default();

    for (key, value) in object {
        if value.is_null() {
            continue;
        }
        match key.as_str() {
            FIELD => leaf.field = Some(text(value, key, &here)?),
            HEADER_NAME => leaf.header_name = Some(text(value, key, &here)?),
            SORTABLE => leaf.sortable = Some(flag(value, key, &here)?),
            RESIZABLE => leaf.resizable = Some(flag(value, key, &here)?),
            HIDE => leaf.hide = Some(flag(value, key, &here)?),
            // Named filters ("agTextColumnFilter") stay opaque.
            FILTER if value.is_boolean() => leaf.filter = value.as_bool(),
            PINNED => {
                let side = text(value, key, &here)?;
                leaf.pinned = Some(Pinned::parse(&side).ok_or_else(|| {
                    ConfigurationError::invalid_document(&here, format!("unknown pin side `{side}`"))
                })?);
            }
            WIDTH => leaf.width = Some(dimension(value, key, &here)?),
            FLEX => leaf.flex = Some(dimension(value, key, &here)?),
            CELL_RENDERER => leaf.cell_renderer = Some(component(value, key, &here)?),
            HEADER_COMPONENT => leaf.header_component = Some(component(value, key, &here)?),
            HEADER_COMPONENT_PARAMS => {
                let mut params = value.as_object().cloned().ok_or_else(|| {
                    ConfigurationError::invalid_document(&here, "headerComponentParams must be an object")
                })?;
                if let Some(inner) = params.remove(INNER_HEADER_COMPONENT) {
                    if !inner.is_null() {
                        leaf.inner_header_component =
                            Some(component(&inner, INNER_HEADER_COMPONENT, &here)?);
                    }
                }
                if !params.is_empty() {
                    leaf.extra
                        .set_node(HEADER_COMPONENT_PARAMS, ConfigurationNode::from_map(params));
                }
            }
            _ => {
                leaf.extra
                    .set_opt(key.clone(), PropertyValue::from_json(value.clone()));
            }
        }
    }

    Ok(ColumnDefinition::Leaf(leaf))
}

fn parse_group(
    object: &Map<String, Value>,
    children: &Value,
    path: &mut Vec<usize>,
) -> Result<ColumnDefinition, ConfigurationError> {
    let here = describe_path(path);
    let items = children
        .as_array()
        .ok_or_else(|| ConfigurationError::invalid_document(&here, "children must be an array"))?;

    let mut group = ColumnGroup::default();
    for (key, value) in object {
        if value.is_null() {
            continue;
        }
        match key.as_str() {
            CHILDREN => {}
            FIELD => {
                return Err(ConfigurationError::GroupWithFieldBinding {
                    path: here,
                    field: value.as_str().map_or_else(|| value.to_string(), str::to_string),
                })
            }
            CELL_RENDERER | HEADER_COMPONENT => {
                return Err(ConfigurationError::GroupWithRendererBinding {
                    path: here,
                    component: value.as_str().map_or_else(|| value.to_string(), str::to_string),
                })
            }
            HEADER_NAME => group.header_name = Some(text(value, key, &here)?),
            GROUP_ID => group.group_id = Some(text(value, key, &here)?),
            MARRY_CHILDREN => group.marry_children = Some(flag(value, key, &here)?),
            OPEN_BY_DEFAULT => group.open_by_default = Some(flag(value, key, &here)?),
            _ => {
                group
                    .extra
                    .set_opt(key.clone(), PropertyValue::from_json(value.clone()));
            }
        }
    }

    // Catches an inner header component hidden in headerComponentParams.
    check_group_bindings(&group.extra, path)?;
    if items.is_empty() {
        return Err(ConfigurationError::EmptyGroup { path: here });
    }

    for (index, item) in items.iter().enumerate() {
        path.push(index);
        let child = parse_at(item, path);
        path.pop();
        group.children.push(child?);
    }

    Ok(ColumnDefinition::Group(group))
}

fn text(value: &Value, key: &str, here: &str) -> Result<String, ConfigurationError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigurationError::invalid_document(here, format!("`{key}` must be a string")))
}

fn flag(value: &Value, key: &str, here: &str) -> Result<bool, ConfigurationError> {
    value
        .as_bool()
        .ok_or_else(|| ConfigurationError::invalid_document(here, format!("`{key}` must be a boolean")))
}

fn dimension(value: &Value, key: &str, here: &str) -> Result<u32, ConfigurationError> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            ConfigurationError::invalid_document(here, format!("`{key}` must be a non-negative integer"))
        })
}

fn component(value: &Value, key: &str, here: &str) -> Result<ComponentRef, ConfigurationError> {
    let name = text(value, key, here)?;
    ComponentRef::new(name)
        .map_err(|e| ConfigurationError::invalid_document(here, format!("`{key}`: {e}")))
}
