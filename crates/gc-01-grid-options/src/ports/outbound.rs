//! Driven ports: collaborators the options engine notifies.

use crate::domain::columns::ComponentRole;
use grid_types::ComponentRef;

/// Registry of client components referenced by column definitions.
///
/// The generated client artifact declares every registered component exactly
/// once. How references turn into client code is outside this crate.
pub trait ComponentReferenceRegistry: Send + Sync {
    /// Record a reference.
    ///
    /// Returns `true` only the first time a distinct reference is seen,
    /// whatever role it is used in.
    fn register(&self, reference: &ComponentRef, role: ComponentRole) -> bool;

    /// Whether a reference has been recorded.
    fn is_registered(&self, reference: &ComponentRef) -> bool;

    /// Every recorded reference, in first-registration order.
    fn references(&self) -> Vec<ComponentRef>;
}
