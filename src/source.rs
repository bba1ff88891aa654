use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    cache::EventCache,
    context::{self, TraceContext},
    data::TraceData,
    error::TraceError,
    id::ActivityId,
    level::EventKind,
    listener::{text::TextListener, TraceListener},
    switch::SourceSwitch,
};

/// An ordered, insertion-stable collection of listeners, unique by name.
///
/// Emission takes the read lock; add/remove take the write lock. Adding a
/// listener under a name already present replaces that listener in place,
/// keeping its position. Listeners are never removed implicitly.
#[derive(Default)]
pub struct Listeners {
    inner: RwLock<Vec<Arc<dyn TraceListener>>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn TraceListener>) {
        let mut inner = self.inner.write();

        match inner.iter_mut().find(|l| l.name() == listener.name()) {
            Some(slot) => *slot = listener,
            None => inner.push(listener),
        }
    }

    /// Remove the listener with the given name, if present.
    pub fn remove(&self, name: &str) -> bool {
        let mut inner = self.inner.write();
        let before = inner.len();

        inner.retain(|l| l.name() != name);

        inner.len() != before
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TraceListener>> {
        self.inner.read().iter().find(|l| l.name() == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Visit every listener in insertion order.
    pub fn for_each(&self, mut f: impl FnMut(&dyn TraceListener)) {
        for listener in self.inner.read().iter() {
            f(&**listener);
        }
    }
}

/// A named entry point for emitting diagnostic events.
///
/// A source owns exactly one [`SourceSwitch`] and an ordered listener
/// collection. When the switch rejects an event's kind, emission returns
/// immediately: no event cache is built and no listener is touched.
/// Otherwise one cache is built for the call and every listener receives
/// the event in insertion order; listener failures are contained inside
/// listeners, so the fan-out always completes.
pub struct TraceSource {
    name: String,
    switch: RwLock<Arc<SourceSwitch>>,
    listeners: Listeners,
    attributes: RwLock<BTreeMap<String, String>>,
    context: TraceContext,
}

impl TraceSource {
    /// A source using the process-wide shared context.
    ///
    /// A fresh source has one default stdout listener, a switch at level
    /// `Off` named after the source, and no attributes.
    pub fn new(name: impl Into<String>) -> Result<Self, TraceError> {
        Self::with_context(name, context::shared().clone())
    }

    /// A source scoped to an explicit context.
    pub fn with_context(
        name: impl Into<String>,
        context: TraceContext,
    ) -> Result<Self, TraceError> {
        let name = name.into();

        if name.is_empty() {
            return Err(TraceError::EmptyName);
        }

        let listeners = Listeners::new();
        listeners.add(Arc::new(TextListener::stdout("Default")));

        Ok(TraceSource {
            switch: RwLock::new(Arc::new(SourceSwitch::new(name.clone(), ""))),
            name,
            listeners,
            attributes: RwLock::new(BTreeMap::new()),
            context,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn switch(&self) -> Arc<SourceSwitch> {
        self.switch.read().clone()
    }

    /// Replace the switch. Readers mid-emission keep the switch they
    /// already resolved.
    pub fn set_switch(&self, switch: Arc<SourceSwitch>) {
        *self.switch.write() = switch;
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    pub fn context(&self) -> &TraceContext {
        &self.context
    }

    pub fn attribute(&self, key: &str) -> Option<String> {
        self.attributes.read().get(key).cloned()
    }

    pub fn set_attribute(&self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.write().insert(key.into(), value.into());
    }

    /// A snapshot of the attribute map.
    pub fn attributes(&self) -> BTreeMap<String, String> {
        self.attributes.read().clone()
    }

    pub fn should_trace(&self, kind: EventKind) -> bool {
        self.switch.read().should_trace(kind)
    }

    pub fn trace_event(&self, kind: EventKind, id: i32, message: Option<&str>) {
        self.dispatch(kind, |listener, cache| {
            listener.trace_event(Some(cache), &self.name, kind, id, message);
        });
    }

    /// Shorthand for an [`EventKind::Information`] event with id 0.
    pub fn trace_information(&self, message: &str) {
        self.trace_event(EventKind::Information, 0, Some(message));
    }

    pub fn trace_data(&self, kind: EventKind, id: i32, items: &[TraceData]) {
        self.dispatch(kind, |listener, cache| {
            listener.trace_data(Some(cache), &self.name, kind, id, items);
        });
    }

    pub fn trace_transfer(&self, id: i32, message: &str, related: ActivityId) {
        self.dispatch(EventKind::Transfer, |listener, cache| {
            listener.trace_transfer(Some(cache), &self.name, id, message, related);
        });
    }

    pub fn flush(&self) {
        self.listeners.for_each(|listener| listener.flush());
    }

    pub fn close(&self) {
        self.listeners.for_each(|listener| listener.close());
    }

    fn dispatch(&self, kind: EventKind, f: impl Fn(&dyn TraceListener, &EventCache)) {
        if !self.should_trace(kind) {
            return;
        }

        let cache = EventCache::with_correlation(self.context.correlation());
        let auto_flush = self.context.auto_flush();

        self.listeners.for_each(|listener| {
            f(listener, &cache);

            if auto_flush {
                listener.flush();
            }
        });
    }
}
