//! Depth-first walks over a column tree.

use crate::domain::columns::{ColumnDefinition, ColumnGroup, ComponentRole, LeafColumn};
use crate::ports::ComponentReferenceRegistry;
use grid_types::ComponentRef;

/// Callbacks for [`walk_columns`].
///
/// `path` holds the index of the node at each depth, so `[1, 0]` is the first
/// child of the second top-level column.
pub trait ColumnVisitor {
    fn visit_leaf(&mut self, path: &[usize], leaf: &LeafColumn);

    fn enter_group(&mut self, _path: &[usize], _group: &ColumnGroup) {}

    fn leave_group(&mut self, _path: &[usize], _group: &ColumnGroup) {}
}

/// Visit every node depth-first, children in order.
pub fn walk_columns(columns: &[ColumnDefinition], visitor: &mut dyn ColumnVisitor) {
    let mut path = Vec::new();
    walk_level(columns, visitor, &mut path);
}

fn walk_level(
    columns: &[ColumnDefinition],
    visitor: &mut dyn ColumnVisitor,
    path: &mut Vec<usize>,
) {
    for (index, column) in columns.iter().enumerate() {
        path.push(index);
        match column {
            ColumnDefinition::Leaf(leaf) => visitor.visit_leaf(path, leaf),
            ColumnDefinition::Group(group) => {
                visitor.enter_group(path, group);
                walk_level(&group.children, visitor, path);
                visitor.leave_group(path, group);
            }
        }
        path.pop();
    }
}

/// Collects every component reference carried by leaf columns.
#[derive(Debug, Default)]
pub struct ComponentReferenceCollector {
    pub found: Vec<(ComponentRole, ComponentRef)>,
}

impl ColumnVisitor for ComponentReferenceCollector {
    fn visit_leaf(&mut self, _path: &[usize], leaf: &LeafColumn) {
        self.found.extend(
            leaf.component_refs()
                .map(|(role, reference)| (role, reference.clone())),
        );
    }
}

/// Register every component reference in `columns`.
///
/// Returns the number of references the registry had not seen before.
pub fn register_component_references(
    columns: &[ColumnDefinition],
    registry: &dyn ComponentReferenceRegistry,
) -> usize {
    let mut collector = ComponentReferenceCollector::default();
    walk_columns(columns, &mut collector);

    collector
        .found
        .iter()
        .filter(|(role, reference)| registry.register(reference, *role))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryComponentRegistry;

    fn component(name: &str) -> ComponentRef {
        ComponentRef::new(name).unwrap()
    }

    #[derive(Default)]
    struct Trace(Vec<String>);

    impl ColumnVisitor for Trace {
        fn visit_leaf(&mut self, path: &[usize], leaf: &LeafColumn) {
            self.0.push(format!(
                "leaf {:?} {}",
                path,
                leaf.field.as_deref().unwrap_or("-")
            ));
        }

        fn enter_group(&mut self, path: &[usize], _group: &ColumnGroup) {
            self.0.push(format!("enter {path:?}"));
        }

        fn leave_group(&mut self, path: &[usize], _group: &ColumnGroup) {
            self.0.push(format!("leave {path:?}"));
        }
    }

    #[test]
    fn test_walk_is_depth_first() {
        let columns = vec![
            ColumnDefinition::leaf("name"),
            ColumnDefinition::group(vec![
                ColumnDefinition::leaf("a"),
                ColumnDefinition::group(vec![ColumnDefinition::leaf("b")]).unwrap(),
            ])
            .unwrap(),
        ];

        let mut trace = Trace::default();
        walk_columns(&columns, &mut trace);

        assert_eq!(
            trace.0,
            vec![
                "leaf [0] name",
                "enter [1]",
                "leaf [1, 0] a",
                "enter [1, 1]",
                "leaf [1, 1, 0] b",
                "leave [1, 1]",
                "leave [1]",
            ]
        );
    }

    #[test]
    fn test_each_distinct_reference_registered_once() {
        let renderer = component("StatusRenderer");
        let columns = vec![
            ColumnDefinition::builder()
                .field("a")
                .cell_renderer(renderer.clone())
                .header_component(component("FancyHeader"))
                .build()
                .unwrap(),
            ColumnDefinition::group(vec![ColumnDefinition::builder()
                .field("b")
                .cell_renderer(renderer.clone())
                .inner_header_component(component("InnerHeader"))
                .build()
                .unwrap()])
            .unwrap(),
        ];

        let registry = InMemoryComponentRegistry::new();
        let registered = register_component_references(&columns, &registry);

        assert_eq!(registered, 3);
        assert_eq!(
            registry.references(),
            vec![renderer, component("FancyHeader"), component("InnerHeader")]
        );

        // A second walk finds nothing new.
        assert_eq!(register_component_references(&columns, &registry), 0);
    }

    #[test]
    fn test_references_given_as_properties_are_registered() {
        let params = crate::domain::ConfigurationNode::new()
            .with("innerHeaderComponent", "PlainHeader")
            .with("menuIcon", "fa-bars");
        let column = ColumnDefinition::builder()
            .field("a")
            .property("cellRenderer", "HiddenRenderer")
            .property("headerComponentParams", params)
            .build()
            .unwrap();

        assert_eq!(
            column.to_value(),
            serde_json::json!({
                "field": "a",
                "cellRenderer": "HiddenRenderer",
                "headerComponentParams": {"menuIcon": "fa-bars", "innerHeaderComponent": "PlainHeader"}
            })
        );

        let registry = InMemoryComponentRegistry::new();
        assert_eq!(register_component_references(&[column], &registry), 2);
        assert_eq!(
            registry.references(),
            vec![component("HiddenRenderer"), component("PlainHeader")]
        );
    }
}
