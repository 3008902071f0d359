//! # Listener Registry
//!
//! Tracks which widget instances have an active data channel.
//!
//! Registration is an atomic check-and-set on the listener id: two widgets
//! racing to register the same id see exactly one `true`. The registry is an
//! injected object; widget teardown removes its entry through
//! [`ListenerRegistry::deregister`].

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use grid_types::{ListenerId, ProducerIdentity};
use std::time::Instant;
use tracing::debug;

/// One active registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerRegistration {
    pub listener_id: ListenerId,
    /// Producer used when a request names none. Updated on every
    /// registration that supplies one.
    pub producer: Option<ProducerIdentity>,
    /// Whether the widget side has installed a receiver for responses.
    pub receiver_installed: bool,
    pub registered_at: Instant,
}

/// Concurrent set of active listener registrations.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    entries: DashMap<ListenerId, ListenerRegistration>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, recording its producer.
    ///
    /// Returns whether a new registration was created. Registering an
    /// existing id only refreshes the recorded producer when one is given.
    pub fn register(&self, listener_id: &ListenerId, producer: Option<ProducerIdentity>) -> bool {
        match self.entries.entry(listener_id.clone()) {
            Entry::Vacant(vacant) => {
                debug!(
                    listener_id = %listener_id,
                    producer = ?producer.as_ref().map(ProducerIdentity::as_str),
                    "Listener registered"
                );
                vacant.insert(ListenerRegistration {
                    listener_id: listener_id.clone(),
                    producer,
                    receiver_installed: false,
                    registered_at: Instant::now(),
                });
                true
            }
            Entry::Occupied(mut occupied) => {
                if producer.is_some() {
                    occupied.get_mut().producer = producer;
                }
                false
            }
        }
    }

    /// Register without a producer. `true` only for the first call per id.
    pub fn register_if_absent(&self, listener_id: &ListenerId) -> bool {
        self.register(listener_id, None)
    }

    #[must_use]
    pub fn is_registered(&self, listener_id: &ListenerId) -> bool {
        self.entries.contains_key(listener_id)
    }

    /// Mark the widget's receiver as installed.
    ///
    /// Returns `true` if this call installed it; `false` if it was already
    /// installed or the listener is unknown.
    pub fn mark_receiver_installed(&self, listener_id: &ListenerId) -> bool {
        match self.entries.get_mut(listener_id) {
            Some(mut registration) if !registration.receiver_installed => {
                registration.receiver_installed = true;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn has_receiver(&self, listener_id: &ListenerId) -> bool {
        self.entries
            .get(listener_id)
            .is_some_and(|registration| registration.receiver_installed)
    }

    /// Producer recorded for a listener.
    #[must_use]
    pub fn producer_for(&self, listener_id: &ListenerId) -> Option<ProducerIdentity> {
        self.entries
            .get(listener_id)
            .and_then(|registration| registration.producer.clone())
    }

    /// Remove a registration. Returns whether one existed.
    pub fn deregister(&self, listener_id: &ListenerId) -> bool {
        let removed = self.entries.remove(listener_id).is_some();
        if removed {
            debug!(listener_id = %listener_id, "Listener deregistered");
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of every registration, ordered by listener id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ListenerRegistration> {
        let mut registrations: Vec<ListenerRegistration> = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        registrations.sort_by(|a, b| a.listener_id.cmp(&b.listener_id));
        registrations
    }
}
