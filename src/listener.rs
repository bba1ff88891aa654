/*!
The listener seam: a polymorphic sink for trace output.

[`TraceListener`] requires only the low-level `write`/`write_line` pair plus
lifecycle calls; the higher-level event entry points are provided methods
layered on top through the shared [`write_default_header`] and
[`write_default_footer`] functions. Concrete encodings
([`text::TextListener`], [`delimited::DelimitedListener`],
[`xml::XmlListener`]) override the event methods where their wire format
diverges from the default text layout.
*/

pub mod delimited;
pub mod text;
pub mod xml;

use core::ops::BitOr;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

use crate::{
    cache::EventCache,
    data::{self, TraceData},
    id::ActivityId,
    level::EventKind,
    platform,
};

/// Which ambient fields a listener appends after each event.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct TraceOptions(u8);

impl TraceOptions {
    pub const NONE: TraceOptions = TraceOptions(0);
    pub const PROCESS_ID: TraceOptions = TraceOptions(1);
    pub const LOGICAL_OPERATION_STACK: TraceOptions = TraceOptions(1 << 1);
    pub const THREAD_ID: TraceOptions = TraceOptions(1 << 2);
    pub const DATE_TIME: TraceOptions = TraceOptions(1 << 3);
    pub const TIMESTAMP: TraceOptions = TraceOptions(1 << 4);
    pub const CALLSTACK: TraceOptions = TraceOptions(1 << 5);
    pub const ALL: TraceOptions = TraceOptions(0b11_1111);

    pub fn contains(self, other: TraceOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    fn to_bits(self) -> u8 {
        self.0
    }

    fn from_bits(bits: u8) -> Self {
        TraceOptions(bits & TraceOptions::ALL.0)
    }
}

impl BitOr for TraceOptions {
    type Output = TraceOptions;

    fn bitor(self, rhs: TraceOptions) -> TraceOptions {
        TraceOptions(self.0 | rhs.0)
    }
}

/// Per-listener identity and formatting state.
///
/// Indentation belongs to the listener instance, not to any global. The
/// pending-indent flag makes `write` prefix the indent string exactly once
/// per line.
pub struct ListenerState {
    name: String,
    options: AtomicU8,
    indent_level: AtomicUsize,
    indent_size: AtomicUsize,
    needs_indent: AtomicBool,
}

impl ListenerState {
    pub fn new(name: impl Into<String>) -> Self {
        ListenerState {
            name: name.into(),
            options: AtomicU8::new(0),
            indent_level: AtomicUsize::new(0),
            indent_size: AtomicUsize::new(4),
            needs_indent: AtomicBool::new(true),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> TraceOptions {
        TraceOptions::from_bits(self.options.load(Ordering::Relaxed))
    }

    pub fn set_options(&self, options: TraceOptions) {
        self.options.store(options.to_bits(), Ordering::Relaxed);
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level.load(Ordering::Relaxed)
    }

    pub fn set_indent_level(&self, level: usize) {
        self.indent_level.store(level, Ordering::Relaxed);
    }

    pub fn indent(&self) {
        self.indent_level.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unindent(&self) {
        let _ = self
            .indent_level
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |level| {
                level.checked_sub(1)
            });
    }

    pub fn indent_size(&self) -> usize {
        self.indent_size.load(Ordering::Relaxed)
    }

    pub fn set_indent_size(&self, size: usize) {
        self.indent_size.store(size, Ordering::Relaxed);
    }

    pub(crate) fn take_needs_indent(&self) -> bool {
        self.needs_indent.swap(false, Ordering::Relaxed)
    }

    pub(crate) fn set_needs_indent(&self, pending: bool) {
        self.needs_indent.store(pending, Ordering::Relaxed);
    }

    pub(crate) fn indent_text(&self) -> String {
        " ".repeat(self.indent_level() * self.indent_size())
    }
}

/// A sink for trace output; one instance per destination.
///
/// Implementations swallow their own I/O failures, so dispatch from a
/// source always reaches every registered listener and indent state stays
/// balanced. `close` must be idempotent; writes after close are no-ops.
pub trait TraceListener: Send + Sync {
    /// Identity and formatting state for this listener.
    fn state(&self) -> &ListenerState;

    /// Write text, prefixing the indent string at the start of a line.
    fn write(&self, text: &str);

    /// Write text followed by a line terminator.
    fn write_line(&self, text: &str);

    fn flush(&self);

    /// Release the destination. Safe to call repeatedly.
    fn close(&self);

    fn name(&self) -> &str {
        self.state().name()
    }

    fn options(&self) -> TraceOptions {
        self.state().options()
    }

    /// Emit a single event: header line plus the option-gated footer block.
    fn trace_event(
        &self,
        cache: Option<&EventCache>,
        source: &str,
        kind: EventKind,
        id: i32,
        message: Option<&str>,
    ) {
        write_default_header(self, source, kind, id, message.unwrap_or(""));
        write_default_footer(self, cache);
    }

    /// Emit an event whose message is the joined payload items.
    fn trace_data(
        &self,
        cache: Option<&EventCache>,
        source: &str,
        kind: EventKind,
        id: i32,
        items: &[TraceData],
    ) {
        write_default_header(self, source, kind, id, &data::join(items, ", "));
        write_default_footer(self, cache);
    }

    /// Emit a transfer: a [`EventKind::Transfer`] event with the related
    /// activity appended to the message.
    fn trace_transfer(
        &self,
        cache: Option<&EventCache>,
        source: &str,
        id: i32,
        message: &str,
        related: ActivityId,
    ) {
        let message = format!("{message}, relatedActivityId={related}");

        self.trace_event(cache, source, EventKind::Transfer, id, Some(&message));
    }

    /// Record a failure: one `Fail:` line, plus the detail indented on its
    /// own line when given.
    fn fail(&self, message: &str, detail: Option<&str>) {
        self.write_line(&format!("Fail: {message}"));

        if let Some(detail) = detail {
            let state = self.state();

            state.indent();
            self.write_line(detail);
            state.unindent();
        }
    }
}

/// The default header layout shared by listener implementations.
pub fn write_default_header<L: TraceListener + ?Sized>(
    listener: &L,
    source: &str,
    kind: EventKind,
    id: i32,
    message: &str,
) {
    listener.write_line(&format!("{source} {kind}: {id} : {message}"));
}

/// The default footer block: one line per enabled option bit, one indent
/// level deeper than the header. Nothing is written without a cache.
pub fn write_default_footer<L: TraceListener + ?Sized>(
    listener: &L,
    cache: Option<&EventCache>,
) {
    let Some(cache) = cache else {
        return;
    };

    let options = listener.options();

    if options.is_none() {
        return;
    }

    let state = listener.state();
    state.indent();

    if options.contains(TraceOptions::PROCESS_ID) {
        listener.write_line(&format!("ProcessId={}", cache.process_id()));
    }

    if options.contains(TraceOptions::LOGICAL_OPERATION_STACK) {
        listener.write_line(&format!(
            "LogicalOperationStack={}",
            join_ids(cache.logical_operation_stack())
        ));
    }

    if options.contains(TraceOptions::THREAD_ID) {
        listener.write_line(&format!("ThreadId={}", cache.thread_id()));
    }

    if options.contains(TraceOptions::DATE_TIME) {
        listener.write_line(&format!(
            "DateTime={}",
            platform::rfc3339(cache.date_time())
        ));
    }

    if options.contains(TraceOptions::TIMESTAMP) {
        listener.write_line(&format!("Timestamp={}", cache.timestamp()));
    }

    if options.contains(TraceOptions::CALLSTACK) {
        listener.write_line(&format!("Callstack={}", cache.callstack()));
    }

    state.unindent();
}

pub(crate) fn join_ids(ids: &[ActivityId]) -> String {
    let mut out = String::new();

    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }

        use core::fmt::Write as _;
        let _ = write!(out, "{}", id);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_compose_and_query() {
        let options = TraceOptions::PROCESS_ID | TraceOptions::DATE_TIME;

        assert!(options.contains(TraceOptions::PROCESS_ID));
        assert!(options.contains(TraceOptions::DATE_TIME));
        assert!(!options.contains(TraceOptions::CALLSTACK));
        assert!(TraceOptions::ALL.contains(options));
        assert!(TraceOptions::NONE.is_none());
    }

    #[test]
    fn indent_is_clamped_at_zero() {
        let state = ListenerState::new("test");

        state.unindent();
        assert_eq!(state.indent_level(), 0);

        state.indent();
        state.indent();
        assert_eq!(state.indent_level(), 2);

        state.unindent();
        assert_eq!(state.indent_level(), 1);
    }

    #[test]
    fn indent_text_scales_with_size() {
        let state = ListenerState::new("test");
        state.set_indent_level(2);
        state.set_indent_size(3);

        assert_eq!(state.indent_text(), "      ");
    }

    #[test]
    fn join_ids_is_comma_space_separated() {
        let ids = [
            crate::id::ActivityId::from_u128(1),
            crate::id::ActivityId::from_u128(2),
        ];

        assert_eq!(
            join_ids(&ids),
            "00000000-0000-0000-0000-000000000001, 00000000-0000-0000-0000-000000000002"
        );
    }
}
