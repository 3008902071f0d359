//! Result of initializing a grid widget.

use gc_01_grid_options::ColumnDocument;
use grid_types::{ListenerId, ProducerIdentity, WidgetId};
use serde_json::{Map, Value};

/// Everything the client needs to render a grid and open its data channel.
#[derive(Debug, Clone, PartialEq)]
pub struct GridInitialization {
    pub widget_id: WidgetId,
    pub listener_id: ListenerId,
    pub producer: Option<ProducerIdentity>,
    /// Flattened options document.
    pub grid_options: Map<String, Value>,
    pub columns: ColumnDocument,
    /// False when the listener was already registered by an earlier call.
    pub new_listener: bool,
    /// Component references registered for the first time by this call.
    pub new_component_references: usize,
}

impl GridInitialization {
    /// Combined document handed to the client widget.
    ///
    /// ```text
    /// {
    ///   "listenerId": "grid-42",
    ///   "gridOptions": { ...flattened options... },
    ///   "columnDefs": [ ... ],
    ///   "defaultColDef": { ... },
    ///   "useGeneratedDefaultColDef": true
    /// }
    /// ```
    #[must_use]
    pub fn to_client_document(&self) -> Value {
        let mut document = Map::new();
        document.insert(
            "listenerId".to_string(),
            Value::String(self.listener_id.to_string()),
        );
        document.insert(
            "gridOptions".to_string(),
            Value::Object(self.grid_options.clone()),
        );
        document.insert(
            "columnDefs".to_string(),
            Value::Array(self.columns.column_defs.clone()),
        );
        document.insert(
            "defaultColDef".to_string(),
            self.columns.default_col_def.clone(),
        );
        document.insert(
            "useGeneratedDefaultColDef".to_string(),
            Value::Bool(self.columns.uses_generated_default()),
        );
        Value::Object(document)
    }
}
