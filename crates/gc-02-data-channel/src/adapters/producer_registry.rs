//! Explicit producer registry.
//!
//! Maps producer identities to a shared instance or to a factory that builds
//! a fresh producer per request. Identities are registered up front, so the
//! set of valid producers is enumerable at any time.

use crate::ports::{DataProducer, ProducerResolver};
use dashmap::DashMap;
use grid_types::ProducerIdentity;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds a producer for one request.
pub type ProducerFactory = Arc<dyn Fn() -> Arc<dyn DataProducer> + Send + Sync>;

/// Lifetime of the producer behind an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerScope {
    /// One shared instance serves every request.
    Singleton,
    /// A new instance is built for each request.
    PerRequest,
}

#[derive(Clone)]
enum ProducerEntry {
    Singleton(Arc<dyn DataProducer>),
    PerRequest(ProducerFactory),
}

impl ProducerEntry {
    fn scope(&self) -> ProducerScope {
        match self {
            Self::Singleton(_) => ProducerScope::Singleton,
            Self::PerRequest(_) => ProducerScope::PerRequest,
        }
    }

    fn instance(&self) -> Arc<dyn DataProducer> {
        match self {
            Self::Singleton(producer) => producer.clone(),
            Self::PerRequest(factory) => factory(),
        }
    }
}

/// [`ProducerResolver`] backed by explicit registrations.
#[derive(Default)]
pub struct ProducerRegistry {
    entries: DashMap<ProducerIdentity, ProducerEntry>,
}

impl ProducerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shared instance. Returns the scope of any replaced entry.
    pub fn register_singleton(
        &self,
        identity: ProducerIdentity,
        producer: Arc<dyn DataProducer>,
    ) -> Option<ProducerScope> {
        self.insert(identity, ProducerEntry::Singleton(producer))
    }

    /// Register a producer value as a shared instance.
    pub fn register<P>(&self, identity: ProducerIdentity, producer: P) -> Option<ProducerScope>
    where
        P: DataProducer + 'static,
    {
        self.register_singleton(identity, Arc::new(producer))
    }

    /// Register a factory invoked once per request.
    pub fn register_factory<F>(&self, identity: ProducerIdentity, factory: F) -> Option<ProducerScope>
    where
        F: Fn() -> Arc<dyn DataProducer> + Send + Sync + 'static,
    {
        self.insert(identity, ProducerEntry::PerRequest(Arc::new(factory)))
    }

    /// Builder-style variant of [`Self::register`].
    #[must_use]
    pub fn with_producer<P>(self, identity: ProducerIdentity, producer: P) -> Self
    where
        P: DataProducer + 'static,
    {
        self.register(identity, producer);
        self
    }

    pub fn deregister(&self, identity: &ProducerIdentity) -> bool {
        self.entries.remove(identity).is_some()
    }

    #[must_use]
    pub fn scope_of(&self, identity: &ProducerIdentity) -> Option<ProducerScope> {
        self.entries.get(identity).map(|entry| entry.scope())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&self, identity: ProducerIdentity, entry: ProducerEntry) -> Option<ProducerScope> {
        let scope = entry.scope();
        let replaced = self
            .entries
            .insert(identity.clone(), entry)
            .map(|old| old.scope());
        info!(producer = %identity, scope = ?scope, replaced = replaced.is_some(), "Producer registered");
        replaced
    }
}

impl ProducerResolver for ProducerRegistry {
    fn resolve(&self, identity: &ProducerIdentity) -> Option<Arc<dyn DataProducer>> {
        // Clone the entry out so a factory never runs under the shard lock.
        let entry = self.entries.get(identity).map(|entry| entry.value().clone());
        let producer = entry.map(|entry| entry.instance());
        if producer.is_none() {
            debug!(producer = %identity, "Producer identity did not resolve");
        }
        producer
    }

    fn contains(&self, identity: &ProducerIdentity) -> bool {
        self.entries.contains_key(identity)
    }

    fn identities(&self) -> Vec<ProducerIdentity> {
        let mut identities: Vec<ProducerIdentity> =
            self.entries.iter().map(|entry| entry.key().clone()).collect();
        identities.sort();
        identities
    }
}

impl fmt::Debug for ProducerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerRegistry")
            .field("identities", &self.identities())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProducerError;
    use async_trait::async_trait;
    use grid_types::{DataRequest, ListenerId};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(Value);

    #[async_trait]
    impl DataProducer for Fixed {
        async fn fetch_data(&self, _request: &DataRequest) -> Result<Option<Value>, ProducerError> {
            Ok(Some(self.0.clone()))
        }
    }

    fn identity(name: &str) -> ProducerIdentity {
        ProducerIdentity::new(name).unwrap()
    }

    fn request() -> DataRequest {
        DataRequest::new(ListenerId::new("grid-1").unwrap())
    }

    #[tokio::test]
    async fn test_singleton_resolves_same_instance() {
        let registry = ProducerRegistry::new().with_producer(identity("orders"), Fixed(json!([1])));

        let a = registry.resolve(&identity("orders")).unwrap();
        let b = registry.resolve(&identity("orders")).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.fetch_data(&request()).await.unwrap(), Some(json!([1])));
        assert_eq!(registry.scope_of(&identity("orders")), Some(ProducerScope::Singleton));
    }

    #[test]
    fn test_factory_builds_per_request() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let registry = ProducerRegistry::new();
        registry.register_factory(identity("reports"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(Fixed(json!("r"))) as Arc<dyn DataProducer>
        });

        registry.resolve(&identity("reports")).unwrap();
        registry.resolve(&identity("reports")).unwrap();

        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert_eq!(registry.scope_of(&identity("reports")), Some(ProducerScope::PerRequest));
    }

    #[test]
    fn test_contains_builds_nothing() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let registry = ProducerRegistry::new();
        registry.register_factory(identity("reports"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(Fixed(json!("r"))) as Arc<dyn DataProducer>
        });

        assert!(registry.contains(&identity("reports")));
        assert!(!registry.contains(&identity("missing")));
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_identity() {
        let registry = ProducerRegistry::new();
        assert!(registry.resolve(&identity("missing")).is_none());
    }

    #[test]
    fn test_replace_and_enumerate() {
        let registry = ProducerRegistry::new();
        assert_eq!(registry.register(identity("b"), Fixed(json!(1))), None);
        assert_eq!(
            registry.register(identity("b"), Fixed(json!(2))),
            Some(ProducerScope::Singleton)
        );
        registry.register(identity("a"), Fixed(json!(3)));

        assert_eq!(registry.identities(), vec![identity("a"), identity("b")]);
        assert!(registry.deregister(&identity("a")));
        assert_eq!(registry.len(), 1);
    }
}
