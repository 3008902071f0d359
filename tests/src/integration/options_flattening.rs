//! # Options and Column Documents
//!
//! The flattened options document and the column document are the
//! compatibility contract with the client widget. These tests pin their exact
//! wire form.

#[cfg(test)]
mod tests {
    use crate::fixtures::{column_tree, rendering_and_pagination};
    use gc_01_grid_options::{
        register_component_references, ColumnDefinition, ComponentReferenceRegistry,
        CompositeConfiguration, ConfigurationError, ConfigurationNode, InMemoryComponentRegistry,
        SharedNode,
    };
    use grid_types::ComponentRef;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    // =============================================================================
    // FLATTENED OPTIONS
    // =============================================================================

    #[test]
    fn test_two_slots_flatten_to_exact_document() {
        let composite = rendering_and_pagination();

        assert_eq!(
            composite.to_json_string().unwrap(),
            r#"{"animateRows":true,"cellFlashDuration":500,"pagination":true,"paginationPageSize":50}"#
        );
    }

    #[test]
    fn test_cleared_property_is_omitted() {
        let mut composite = rendering_and_pagination();
        composite.configure_slot("pagination", |node| {
            node.clear("paginationPageSize");
        });

        let document = composite.serialize();
        assert!(!document.contains_key("paginationPageSize"));
        assert!(document.values().all(|v| !v.is_null()));
    }

    #[test]
    fn test_later_slot_and_top_level_override() {
        let mut composite = rendering_and_pagination();
        composite.configure_slot("overrides", |node| {
            node.set_int("paginationPageSize", 100);
        });
        assert_eq!(composite.serialize()["paginationPageSize"], json!(100));

        composite.set_top_level("paginationPageSize", 25);
        assert_eq!(composite.serialize()["paginationPageSize"], json!(25));

        let overridden = composite.overridden_keys();
        assert_eq!(overridden.len(), 1);
        assert_eq!(overridden[0].key, "paginationPageSize");
        assert_eq!(overridden[0].sources.len(), 3);
    }

    #[test]
    fn test_shared_node_seen_by_both_composites() {
        let shared = SharedNode::from(ConfigurationNode::new());
        let first = CompositeConfiguration::new().with_slot("theme", shared.clone());
        let second = CompositeConfiguration::new().with_slot("theme", shared.clone());

        shared.write().set_text("rowSelection", "multiple");

        assert_eq!(first.serialize()["rowSelection"], json!("multiple"));
        assert_eq!(second.serialize()["rowSelection"], json!("multiple"));
    }

    // =============================================================================
    // COLUMN DOCUMENT
    // =============================================================================

    #[test]
    fn test_leaf_and_group_column_document() {
        let mut composite = CompositeConfiguration::new();
        composite
            .add_column(ColumnDefinition::leaf("name"))
            .add_group(vec![ColumnDefinition::leaf("a"), ColumnDefinition::leaf("b")])
            .unwrap();

        let document = composite.serialize_columns().unwrap();
        assert_eq!(document.column_defs.len(), 2);

        let group = &document.column_defs[1];
        assert!(group.get("field").is_none());
        assert_eq!(
            group["children"],
            json!([{"field": "a"}, {"field": "b"}])
        );
    }

    #[test]
    fn test_group_with_field_rejected() {
        let result = ColumnDefinition::builder()
            .field("total")
            .children(vec![ColumnDefinition::leaf("a")])
            .build();
        assert!(matches!(
            result,
            Err(ConfigurationError::GroupWithFieldBinding { .. })
        ));

        assert!(ColumnDefinition::builder().field("total").build().is_ok());
        assert!(ColumnDefinition::builder()
            .children(vec![ColumnDefinition::leaf("a")])
            .build()
            .is_ok());
    }

    #[test]
    fn test_invalid_wire_document_rejected() {
        let value = json!([{"field": "x", "children": [{"field": "y"}]}]);
        assert!(ColumnDefinition::list_from_value(&value).is_err());
    }

    #[test]
    fn test_default_column_fallback() {
        let mut composite = rendering_and_pagination();
        let generated = composite.serialize_columns().unwrap();
        assert!(generated.uses_generated_default());
        assert_eq!(
            generated.default_col_def,
            json!({"sortable": true, "filter": true, "resizable": true})
        );

        composite.set_default_column_definition(
            ColumnDefinition::builder().sortable(false).build().unwrap(),
        );
        let explicit = composite.serialize_columns().unwrap();
        assert!(!explicit.uses_generated_default());
        assert_eq!(explicit.default_col_def, json!({"sortable": false}));
    }

    #[test]
    fn test_parsed_document_round_trips() {
        let wire = json!([
            {"field": "name", "headerName": "Name", "pinned": "left"},
            {"headerName": "Totals", "children": [
                {"field": "net", "cellRenderer": "Money"},
                {"field": "gross", "cellRenderer": "Money"}
            ]}
        ]);

        let columns = ColumnDefinition::list_from_value(&wire).unwrap();
        let reserialized: Vec<Value> = columns.iter().map(ColumnDefinition::to_value).collect();
        assert_eq!(Value::Array(reserialized), wire);
    }

    // =============================================================================
    // COMPONENT REFERENCES
    // =============================================================================

    #[test]
    fn test_each_reference_registered_once() {
        let money = ComponentRef::new("Money").unwrap();
        let header = ComponentRef::new("TotalsHeader").unwrap();
        let columns = vec![
            ColumnDefinition::builder()
                .field("net")
                .cell_renderer(money.clone())
                .build()
                .unwrap(),
            ColumnDefinition::group(vec![
                ColumnDefinition::builder()
                    .field("gross")
                    .cell_renderer(money.clone())
                    .inner_header_component(header.clone())
                    .build()
                    .unwrap(),
            ])
            .unwrap(),
        ];
        let registry = InMemoryComponentRegistry::new();

        assert_eq!(register_component_references(&columns, &registry), 2);
        assert_eq!(register_component_references(&columns, &registry), 0);
        assert_eq!(registry.references(), vec![money, header]);
    }

    #[test]
    fn test_deep_tree_serializes() {
        let mut composite = CompositeConfiguration::new();
        for column in column_tree(3, 3) {
            composite.add_column(column);
        }
        let document = composite.serialize_columns().unwrap();
        assert_eq!(document.column_defs.len(), 3);
        assert_eq!(
            document.column_defs[0]["children"][0]["children"][0]["children"][0]["field"],
            json!("c0_0_0_0")
        );
    }

    proptest! {
        #[test]
        fn prop_unset_keys_never_serialized(
            set in proptest::collection::btree_set("[a-z]{1,6}", 0..12),
            cleared in proptest::collection::btree_set("[a-z]{1,6}", 0..6),
        ) {
            let mut composite = CompositeConfiguration::new();
            composite.configure_slot("only", |node| {
                for key in &set {
                    node.set_bool(key.clone(), true);
                }
                for key in &cleared {
                    node.clear(key);
                }
            });

            let document = composite.serialize();
            for key in document.keys() {
                prop_assert!(set.contains(key));
                prop_assert!(!cleared.contains(key));
            }
            prop_assert_eq!(document.len(), set.difference(&cleared).count());
        }
    }
}
