//! A grid widget instance as seen by the server.

use gc_01_grid_options::CompositeConfiguration;
use grid_types::{ListenerId, ProducerIdentity, WidgetId};

/// One grid widget: its stable id, its options and the producer that feeds it.
///
/// The listener id is derived from the widget id once, at construction, so it
/// stays stable for the widget's whole lifetime.
#[derive(Debug)]
pub struct GridComponent {
    widget_id: WidgetId,
    listener_id: ListenerId,
    options: CompositeConfiguration,
    producer: Option<ProducerIdentity>,
}

impl GridComponent {
    /// A widget with a freshly generated id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_widget_id(WidgetId::generate())
    }

    #[must_use]
    pub fn with_widget_id(widget_id: WidgetId) -> Self {
        let listener_id = ListenerId::for_widget(&widget_id);
        Self {
            widget_id,
            listener_id,
            options: CompositeConfiguration::new(),
            producer: None,
        }
    }

    #[must_use]
    pub fn with_producer(mut self, producer: ProducerIdentity) -> Self {
        self.producer = Some(producer);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: CompositeConfiguration) -> Self {
        self.options = options;
        self
    }

    pub fn set_producer(&mut self, producer: Option<ProducerIdentity>) -> &mut Self {
        self.producer = producer;
        self
    }

    pub fn widget_id(&self) -> &WidgetId {
        &self.widget_id
    }

    pub fn listener_id(&self) -> &ListenerId {
        &self.listener_id
    }

    pub fn producer(&self) -> Option<&ProducerIdentity> {
        self.producer.as_ref()
    }

    pub fn options(&self) -> &CompositeConfiguration {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut CompositeConfiguration {
        &mut self.options
    }
}

impl Default for GridComponent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_id_derived_from_widget() {
        let grid = GridComponent::with_widget_id(WidgetId::new("42").unwrap());
        assert_eq!(grid.listener_id().as_str(), "grid-42");
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = GridComponent::new();
        let b = GridComponent::new();
        assert_ne!(a.widget_id(), b.widget_id());
        assert_ne!(a.listener_id(), b.listener_id());
    }

    #[test]
    fn test_options_mutation() {
        let mut grid = GridComponent::new().with_producer(ProducerIdentity::new("orders").unwrap());
        grid.options_mut()
            .configure_slot("pagination", |node| {
                node.set_bool("pagination", true);
            });

        assert_eq!(grid.producer().map(ProducerIdentity::as_str), Some("orders"));
        assert_eq!(
            grid.options().serialize().get("pagination"),
            Some(&serde_json::Value::Bool(true))
        );
    }
}
