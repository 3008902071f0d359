//! Grid Component Controller
//!
//! Orchestrates widget initialization:
//!
//! ```text
//! initialize(grid)
//!   1. serialize columns        ── structural error → abort, nothing registered
//!   2. check producer (optional)── unknown identity → abort
//!   3. flatten options
//!   4. register component references (depth-first walk)
//!   5. register listener + producer, mark receiver installed
//! ```
//!
//! Steps 1 and 2 run before any side effect, so a failed initialization
//! leaves both registries untouched.

use crate::domain::{GridComponent, GridInitialization};
use crate::error::ControllerError;
use crate::ports::GridLifecycleApi;
use gc_01_grid_options::ComponentReferenceRegistry;
use gc_02_data_channel::{ListenerRegistry, ProducerResolver};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Wires grid widgets to the component registry and the listener registry.
pub struct GridComponentController {
    listeners: Arc<ListenerRegistry>,
    components: Arc<dyn ComponentReferenceRegistry>,
    producers: Option<Arc<dyn ProducerResolver>>,
}

impl GridComponentController {
    pub fn new(
        listeners: Arc<ListenerRegistry>,
        components: Arc<dyn ComponentReferenceRegistry>,
    ) -> Self {
        Self {
            listeners,
            components,
            producers: None,
        }
    }

    /// Reject grids whose producer identity does not resolve at
    /// initialization time instead of on their first fetch.
    #[must_use]
    pub fn with_producer_check(mut self, producers: Arc<dyn ProducerResolver>) -> Self {
        self.producers = Some(producers);
        self
    }

    pub fn listeners(&self) -> &Arc<ListenerRegistry> {
        &self.listeners
    }

    pub fn components(&self) -> &Arc<dyn ComponentReferenceRegistry> {
        &self.components
    }

    fn check_producer(&self, grid: &GridComponent) -> Result<(), ControllerError> {
        let (Some(producers), Some(identity)) = (&self.producers, grid.producer()) else {
            return Ok(());
        };
        if !producers.contains(identity) {
            warn!(
                listener_id = %grid.listener_id(),
                producer = %identity,
                "Grid references an unregistered producer"
            );
            return Err(ControllerError::UnknownProducer {
                identity: identity.clone(),
            });
        }
        Ok(())
    }
}

impl GridLifecycleApi for GridComponentController {
    fn initialize(&self, grid: &GridComponent) -> Result<GridInitialization, ControllerError> {
        let start = Instant::now();
        let listener_id = grid.listener_id();

        let columns = grid.options().serialize_columns().map_err(|e| {
            warn!(listener_id = %listener_id, error = %e, "Rejected grid column tree");
            ControllerError::from(e)
        })?;
        self.check_producer(grid)?;

        let grid_options = grid.options().serialize();
        let new_component_references = grid
            .options()
            .register_component_references(self.components.as_ref())?;

        let new_listener = self
            .listeners
            .register(listener_id, grid.producer().cloned());
        self.listeners.mark_receiver_installed(listener_id);

        if !new_listener {
            debug!(listener_id = %listener_id, "Listener already registered");
        }

        info!(
            widget_id = %grid.widget_id(),
            listener_id = %listener_id,
            options = grid_options.len(),
            columns = columns.column_defs.len(),
            new_component_references,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Initialized grid"
        );

        Ok(GridInitialization {
            widget_id: grid.widget_id().clone(),
            listener_id: listener_id.clone(),
            producer: grid.producer().cloned(),
            grid_options,
            columns,
            new_listener,
            new_component_references,
        })
    }

    fn teardown(&self, grid: &GridComponent) -> bool {
        let removed = self.listeners.deregister(grid.listener_id());
        if removed {
            info!(listener_id = %grid.listener_id(), "Tore down grid listener");
        }
        removed
    }
}
