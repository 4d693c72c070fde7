//! Port definition for load status observers.

use std::sync::Arc;

use crate::domain::entities::StatusSnapshot;

/// Receives status snapshots for one resource identifier.
///
/// Called synchronously from the coordinator, so implementations should
/// return quickly. Calling back into the coordinator is allowed.
pub trait StatusObserver: Send + Sync {
    /// Handles a status change.
    fn on_status(&self, snapshot: &StatusSnapshot);
}

impl<F> StatusObserver for F
where
    F: Fn(&StatusSnapshot) + Send + Sync,
{
    fn on_status(&self, snapshot: &StatusSnapshot) {
        self(snapshot);
    }
}

/// Shared observer handle. Identity is the allocation it points to.
pub type ObserverRef = Arc<dyn StatusObserver>;

/// Returns true if both handles point to the same observer.
#[must_use]
pub fn same_observer(a: &ObserverRef, b: &ObserverRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
