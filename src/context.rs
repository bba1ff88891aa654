use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, OnceLock,
};

use crate::{correlation::CorrelationManager, listener::TraceListener, source::Listeners};

/// Shared composition state for a family of trace sources.
///
/// A context owns the correlation manager its sources snapshot from, a
/// facade-level listener collection for direct writes, and the auto-flush
/// flag (global to the context, not per listener). The core never reaches
/// for hidden globals: sources take a context explicitly, and
/// [`shared`] provides the single process-wide default at the composition
/// root.
#[derive(Clone, Default)]
pub struct TraceContext {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    correlation: CorrelationManager,
    listeners: Listeners,
    auto_flush: AtomicBool,
}

impl TraceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn correlation(&self) -> &CorrelationManager {
        &self.inner.correlation
    }

    /// The facade-level listener collection.
    pub fn listeners(&self) -> &Listeners {
        &self.inner.listeners
    }

    pub fn auto_flush(&self) -> bool {
        self.inner.auto_flush.load(Ordering::Relaxed)
    }

    /// When set, every dispatched or facade write is followed by a flush.
    pub fn set_auto_flush(&self, enabled: bool) {
        self.inner.auto_flush.store(enabled, Ordering::Relaxed);
    }

    /// Write text through every facade listener.
    pub fn write(&self, text: &str) {
        self.broadcast(|listener| listener.write(text));
    }

    pub fn write_line(&self, text: &str) {
        self.broadcast(|listener| listener.write_line(text));
    }

    pub fn fail(&self, message: &str, detail: Option<&str>) {
        self.broadcast(|listener| listener.fail(message, detail));
    }

    pub fn flush(&self) {
        self.inner.listeners.for_each(|listener| listener.flush());
    }

    pub fn close_all(&self) {
        self.inner.listeners.for_each(|listener| listener.close());
    }

    /// Raise the indent level of every facade listener.
    pub fn indent(&self) {
        self.inner
            .listeners
            .for_each(|listener| listener.state().indent());
    }

    pub fn unindent(&self) {
        self.inner
            .listeners
            .for_each(|listener| listener.state().unindent());
    }

    fn broadcast(&self, f: impl Fn(&dyn TraceListener)) {
        let auto_flush = self.auto_flush();

        self.inner.listeners.for_each(|listener| {
            f(listener);

            if auto_flush {
                listener.flush();
            }
        });
    }
}

/// The process-wide default context, created on first use.
pub fn shared() -> &'static TraceContext {
    static SHARED: OnceLock<TraceContext> = OnceLock::new();

    SHARED.get_or_init(TraceContext::new)
}
