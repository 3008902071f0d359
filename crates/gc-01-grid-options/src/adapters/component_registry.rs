//! In-memory component reference registry.

use crate::domain::columns::ComponentRole;
use crate::ports::ComponentReferenceRegistry;
use grid_types::ComponentRef;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

#[derive(Default)]
struct Inner {
    order: Vec<ComponentRef>,
    roles: HashMap<ComponentRef, Vec<ComponentRole>>,
}

/// Process-local [`ComponentReferenceRegistry`].
///
/// Keeps first-registration order and the set of roles each reference was
/// seen in.
#[derive(Default)]
pub struct InMemoryComponentRegistry {
    inner: Mutex<Inner>,
}

impl InMemoryComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Roles a reference has been registered under.
    #[must_use]
    pub fn roles_of(&self, reference: &ComponentRef) -> Vec<ComponentRole> {
        self.inner
            .lock()
            .roles
            .get(reference)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ComponentReferenceRegistry for InMemoryComponentRegistry {
    fn register(&self, reference: &ComponentRef, role: ComponentRole) -> bool {
        let mut inner = self.inner.lock();
        let Inner { order, roles } = &mut *inner;

        match roles.get_mut(reference) {
            Some(seen) => {
                if !seen.contains(&role) {
                    seen.push(role);
                }
                false
            }
            None => {
                roles.insert(reference.clone(), vec![role]);
                order.push(reference.clone());
                debug!(component = %reference, role = ?role, "Component reference registered");
                true
            }
        }
    }

    fn is_registered(&self, reference: &ComponentRef) -> bool {
        self.inner.lock().roles.contains_key(reference)
    }

    fn references(&self) -> Vec<ComponentRef> {
        self.inner.lock().order.clone()
    }
}
