use std::sync::Arc;

use parking_lot::Mutex;

use crate::{error::TraceError, id::ActivityId};

/// Tracks nested logical operations for one logical flow.
///
/// A manager is a cheap handle; clones share the same stack and activity id.
/// The handle itself is the flow context: every source and listener in the
/// same scope shares one, and each independent flow (thread, task) gets its
/// own. Interior access is serialized, so accidental cross-flow sharing is
/// memory-safe, but push/pop pairs only nest correctly within one
/// sequential flow.
#[derive(Clone, Default)]
pub struct CorrelationManager {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    activity: Mutex<ActivityId>,
    stack: Mutex<Vec<ActivityId>>,
}

impl CorrelationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a logical operation under a fresh random id, returning it.
    pub fn start_logical_operation(&self) -> ActivityId {
        let id = ActivityId::random();
        self.start_logical_operation_with(id);

        id
    }

    /// Begin a logical operation under a caller-supplied id.
    pub fn start_logical_operation_with(&self, id: ActivityId) {
        self.inner.stack.lock().push(id);
    }

    /// End the innermost logical operation, returning its id.
    ///
    /// Fails with [`TraceError::EmptyOperationStack`] when no operation is
    /// in flight; the stack is left untouched.
    pub fn stop_logical_operation(&self) -> Result<ActivityId, TraceError> {
        self.inner
            .stack
            .lock()
            .pop()
            .ok_or(TraceError::EmptyOperationStack)
    }

    /// An owned snapshot of the operation stack, most recently started
    /// first.
    pub fn logical_operation_stack(&self) -> Vec<ActivityId> {
        self.inner.stack.lock().iter().rev().copied().collect()
    }

    /// The current activity id, [`ActivityId::NIL`] until set.
    pub fn activity_id(&self) -> ActivityId {
        *self.inner.activity.lock()
    }

    pub fn set_activity_id(&self, id: ActivityId) {
        *self.inner.activity.lock() = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_stop_roundtrips_the_same_id() {
        let manager = CorrelationManager::new();
        let before = manager.logical_operation_stack();

        let started = manager.start_logical_operation();
        let stopped = manager.stop_logical_operation().unwrap();

        assert_eq!(started, stopped);
        assert_eq!(manager.logical_operation_stack(), before);
    }

    #[test]
    fn stop_on_empty_stack_fails_without_mutation() {
        let manager = CorrelationManager::new();

        assert_eq!(
            manager.stop_logical_operation(),
            Err(TraceError::EmptyOperationStack)
        );
        assert!(manager.logical_operation_stack().is_empty());
    }

    #[test]
    fn snapshot_is_most_recent_first() {
        let manager = CorrelationManager::new();
        let outer = ActivityId::from_u128(1);
        let inner = ActivityId::from_u128(2);

        manager.start_logical_operation_with(outer);
        manager.start_logical_operation_with(inner);

        assert_eq!(manager.logical_operation_stack(), vec![inner, outer]);
    }

    #[test]
    fn clones_share_one_stack() {
        let manager = CorrelationManager::new();
        let handle = manager.clone();

        manager.start_logical_operation_with(ActivityId::from_u128(7));

        assert_eq!(handle.logical_operation_stack().len(), 1);
        handle.stop_logical_operation().unwrap();
        assert!(manager.logical_operation_stack().is_empty());
    }

    #[test]
    fn activity_id_defaults_to_nil() {
        let manager = CorrelationManager::new();

        assert!(manager.activity_id().is_nil());

        let id = ActivityId::random();
        manager.set_activity_id(id);

        assert_eq!(manager.activity_id(), id);
    }
}
