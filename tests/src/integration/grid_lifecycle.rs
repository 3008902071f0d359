//! # Grid Lifecycle Through the Runtime
//!
//! initialize → fetch → teardown, with every subsystem wired the way the
//! binary wires it.

#[cfg(test)]
mod tests {
    use crate::fixtures::{identity, rendering_and_pagination};
    use gc_01_grid_options::{ColumnDefinition, ComponentReferenceRegistry};
    use gc_02_data_channel::{ClientError, FnProducer};
    use gc_03_grid_component::{ControllerError, GridComponent, GridLifecycleApi};
    use grid_runtime::{GridRuntime, RuntimeConfig};
    use grid_types::{codes, ComponentRef, DataRequest, WidgetId};
    use serde_json::json;

    fn runtime() -> GridRuntime {
        let mut config = RuntimeConfig::default();
        config.channel.require_registration = true;
        let runtime = GridRuntime::new(config).unwrap();
        runtime.producers().register(
            identity("rows"),
            FnProducer::new(|_: &DataRequest| Ok(Some(json!(["row1", "row2"])))),
        );
        runtime.start().unwrap();
        runtime
    }

    fn grid(widget: &str) -> GridComponent {
        let mut grid = GridComponent::with_widget_id(WidgetId::new(widget).unwrap())
            .with_options(rendering_and_pagination())
            .with_producer(identity("rows"));
        grid.options_mut().add_column(
            ColumnDefinition::builder()
                .field("status")
                .cell_renderer(ComponentRef::new("StatusBadge").unwrap())
                .build()
                .unwrap(),
        );
        grid
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let runtime = runtime();
        let grid = grid("42");

        let init = runtime.controller().initialize(&grid).unwrap();
        let document = init.to_client_document();
        assert_eq!(document["listenerId"], json!("grid-42"));
        assert_eq!(
            serde_json::to_string(&document["gridOptions"]).unwrap(),
            r#"{"animateRows":true,"cellFlashDuration":500,"pagination":true,"paginationPageSize":50}"#
        );
        assert!(runtime
            .components()
            .is_registered(&ComponentRef::new("StatusBadge").unwrap()));

        let response = runtime
            .client()
            .fetch(DataRequest::new(init.listener_id.clone()))
            .await
            .unwrap();
        assert_eq!(response.keyed(), json!({"grid-42": ["row1", "row2"]}));

        assert!(runtime.controller().teardown(&grid));
        let after_teardown = runtime
            .client()
            .fetch(DataRequest::new(init.listener_id.clone()))
            .await;
        assert!(matches!(
            after_teardown,
            Err(ClientError::Failed { code, .. }) if code == codes::LISTENER_NOT_REGISTERED
        ));

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_grids_are_isolated() {
        let runtime = runtime();
        let first = runtime.controller().initialize(&grid("a")).unwrap();
        let second = runtime.controller().initialize(&grid("b")).unwrap();

        let (a, b) = tokio::join!(
            runtime.client().fetch(DataRequest::new(first.listener_id.clone())),
            runtime.client().fetch(DataRequest::new(second.listener_id.clone())),
        );

        assert_eq!(a.unwrap().listener_id, first.listener_id);
        assert_eq!(b.unwrap().listener_id, second.listener_id);
        assert_eq!(runtime.listeners().len(), 2);
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_producer_rejected_at_initialization() {
        let runtime = runtime();
        let grid = GridComponent::new().with_producer(identity("nobody"));

        assert!(matches!(
            runtime.controller().initialize(&grid),
            Err(ControllerError::UnknownProducer { .. })
        ));
        assert!(runtime.listeners().is_empty());
        runtime.shutdown().await;
    }
}
