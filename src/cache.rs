use std::sync::OnceLock;

use time::OffsetDateTime;

use crate::{context, correlation::CorrelationManager, id::ActivityId, platform};

/// A snapshot of ambient context for a single dispatched event.
///
/// The logical operation stack is copied at construction; every other
/// accessor is memoized on first touch, so two reads of the same cache
/// always return identical values. A cache is built once per dispatch and
/// shared by every listener in the fan-out, never across events.
pub struct EventCache {
    stack: Vec<ActivityId>,
    activity: ActivityId,
    date_time: OnceLock<OffsetDateTime>,
    timestamp: OnceLock<u64>,
    thread_id: OnceLock<u64>,
    callstack: OnceLock<String>,
}

impl EventCache {
    /// Snapshot the shared default context's correlation state.
    pub fn new() -> Self {
        Self::with_correlation(context::shared().correlation())
    }

    /// Snapshot an explicit correlation manager.
    pub fn with_correlation(correlation: &CorrelationManager) -> Self {
        EventCache {
            stack: correlation.logical_operation_stack(),
            activity: correlation.activity_id(),
            date_time: OnceLock::new(),
            timestamp: OnceLock::new(),
            thread_id: OnceLock::new(),
            callstack: OnceLock::new(),
        }
    }

    /// Wall-clock time of the event, UTC.
    pub fn date_time(&self) -> OffsetDateTime {
        *self.date_time.get_or_init(platform::now)
    }

    /// Monotonic ticks at the event.
    pub fn timestamp(&self) -> u64 {
        *self.timestamp.get_or_init(platform::ticks)
    }

    pub fn thread_id(&self) -> u64 {
        *self.thread_id.get_or_init(platform::thread_id)
    }

    pub fn process_id(&self) -> u32 {
        platform::process_id()
    }

    pub fn process_name(&self) -> &str {
        platform::process_name()
    }

    /// The operation stack as it stood at construction, most recent first.
    pub fn logical_operation_stack(&self) -> &[ActivityId] {
        &self.stack
    }

    pub fn activity_id(&self) -> ActivityId {
        self.activity
    }

    /// The call stack at first access. Expensive; computed only on demand.
    pub fn callstack(&self) -> &str {
        self.callstack.get_or_init(platform::callstack)
    }
}

impl Default for EventCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_memoized() {
        let cache = EventCache::with_correlation(&CorrelationManager::new());

        assert_eq!(cache.date_time(), cache.date_time());
        assert_eq!(cache.timestamp(), cache.timestamp());
        assert_eq!(cache.thread_id(), cache.thread_id());
    }

    #[test]
    fn stack_is_a_snapshot_not_a_live_view() {
        let manager = CorrelationManager::new();
        manager.start_logical_operation_with(ActivityId::from_u128(1));

        let cache = EventCache::with_correlation(&manager);
        manager.start_logical_operation_with(ActivityId::from_u128(2));

        assert_eq!(
            cache.logical_operation_stack(),
            &[ActivityId::from_u128(1)]
        );
    }

    #[test]
    fn captures_activity_id_at_construction() {
        let manager = CorrelationManager::new();
        let id = ActivityId::from_u128(42);
        manager.set_activity_id(id);

        let cache = EventCache::with_correlation(&manager);
        manager.set_activity_id(ActivityId::NIL);

        assert_eq!(cache.activity_id(), id);
    }

    #[test]
    fn callstack_mentions_this_test() {
        let cache = EventCache::with_correlation(&CorrelationManager::new());

        assert!(!cache.callstack().is_empty());
    }
}
