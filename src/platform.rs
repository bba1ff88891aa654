//! Ambient process and clock facts consumed by event caches and encoders.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    OnceLock,
};
use std::time::Instant;

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

pub(crate) fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub(crate) fn rfc3339(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_default()
}

/// Monotonic ticks (nanoseconds) since the first observation in this process.
pub(crate) fn ticks() -> u64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();

    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

pub(crate) fn process_id() -> u32 {
    std::process::id()
}

pub(crate) fn process_name() -> &'static str {
    static NAME: OnceLock<String> = OnceLock::new();

    NAME.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_default()
    })
}

pub(crate) fn machine_name() -> &'static str {
    static NAME: OnceLock<String> = OnceLock::new();

    NAME.get_or_init(|| {
        std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .unwrap_or_else(|_| "localhost".into())
    })
}

/// A small numeric id for the calling thread, stable for the thread's
/// lifetime.
pub(crate) fn thread_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);

    thread_local! {
        static ID: u64 = NEXT.fetch_add(1, Ordering::Relaxed);
    }

    ID.with(|id| *id)
}

/// Expensive; callers memoize.
pub(crate) fn callstack() -> String {
    std::backtrace::Backtrace::force_capture().to_string()
}
