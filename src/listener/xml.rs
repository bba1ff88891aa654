use std::io::{self, Write};

use parking_lot::Mutex;

use super::{ListenerState, TraceListener};
use crate::{
    cache::EventCache,
    data::TraceData,
    id::ActivityId,
    level::EventKind,
    platform,
};

const EVENT_NS: &str = "http://schemas.microsoft.com/2004/06/E2ETraceEvent";
const SYSTEM_NS: &str = "http://schemas.microsoft.com/2004/06/windows/eventlog/system";

/// Wraps every event in an `E2ETraceEvent` envelope.
///
/// Each emission is one complete, self-contained element on its own line;
/// consecutive emissions are sibling envelopes, so the stream as a whole is
/// not a single well-formed document. Text payloads are escaped; an
/// [`XmlFragment`](crate::XmlFragment) payload is embedded verbatim — the
/// one exception to escaping. Indentation is ignored by this encoding.
pub struct XmlListener<W: io::Write + Send> {
    state: ListenerState,
    writer: Mutex<Option<W>>,
}

enum Payload<'a> {
    Text(&'a str),
    Items(&'a [TraceData<'a>]),
}

impl<W: io::Write + Send> XmlListener<W> {
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        XmlListener {
            state: ListenerState::new(name),
            writer: Mutex::new(Some(writer)),
        }
    }

    fn emit(
        &self,
        cache: Option<&EventCache>,
        source: &str,
        kind: EventKind,
        id: i32,
        payload: Payload,
        related: Option<ActivityId>,
    ) {
        use core::fmt::Write as _;

        let mut xml = String::with_capacity(512);

        let _ = write!(xml, "<E2ETraceEvent xmlns=\"{EVENT_NS}\">");
        let _ = write!(xml, "<System xmlns=\"{SYSTEM_NS}\">");
        let _ = write!(xml, "<EventID>{id}</EventID>");
        xml.push_str("<Type>3</Type>");
        let _ = write!(xml, "<SubType Name=\"{kind}\">0</SubType>");
        let _ = write!(xml, "<Level>{}</Level>", kind.code().min(255));

        let ts = cache
            .map(EventCache::date_time)
            .unwrap_or_else(platform::now);
        let _ = write!(
            xml,
            "<TimeCreated SystemTime=\"{}\"/>",
            platform::rfc3339(ts)
        );

        let _ = write!(xml, "<Source Name=\"{}\"/>", escape_attr(source));

        let activity = cache.map(EventCache::activity_id).unwrap_or(ActivityId::NIL);
        match related {
            Some(related) => {
                let _ = write!(
                    xml,
                    "<Correlation ActivityID=\"{{{activity}}}\" RelatedActivityID=\"{{{related}}}\"/>"
                );
            }
            None => {
                let _ = write!(xml, "<Correlation ActivityID=\"{{{activity}}}\"/>");
            }
        }

        let (process_name, process_id, thread_id) = match cache {
            Some(cache) => (
                cache.process_name().to_owned(),
                cache.process_id(),
                cache.thread_id(),
            ),
            None => (
                platform::process_name().to_owned(),
                platform::process_id(),
                platform::thread_id(),
            ),
        };
        let _ = write!(
            xml,
            "<Execution ProcessName=\"{}\" ProcessID=\"{process_id}\" ThreadID=\"{thread_id}\"/>",
            escape_attr(&process_name)
        );

        xml.push_str("<Channel/>");
        let _ = write!(
            xml,
            "<Computer>{}</Computer>",
            escape_text(platform::machine_name())
        );
        xml.push_str("</System>");

        xml.push_str("<ApplicationData>");
        match payload {
            Payload::Text(text) => xml.push_str(&escape_text(text)),
            Payload::Items(items) => {
                xml.push_str("<TraceData>");

                for item in items {
                    match item {
                        TraceData::Fragment(fragment) => {
                            let _ = write!(xml, "<DataItem>{}</DataItem>", fragment.as_str());
                        }
                        TraceData::Value(value) => {
                            let _ = write!(
                                xml,
                                "<DataItem>{}</DataItem>",
                                escape_text(&value.to_string())
                            );
                        }
                    }
                }

                xml.push_str("</TraceData>");
            }
        }
        xml.push_str("</ApplicationData></E2ETraceEvent>");

        self.write_line(&xml);
    }
}

impl<W: io::Write + Send> TraceListener for XmlListener<W> {
    fn state(&self) -> &ListenerState {
        &self.state
    }

    fn write(&self, text: &str) {
        if let Some(writer) = self.writer.lock().as_mut() {
            let _ = writer.write_all(text.as_bytes());
        }
    }

    fn write_line(&self, text: &str) {
        let mut guard = self.writer.lock();

        if let Some(writer) = guard.as_mut() {
            let _ = writer.write_all(text.as_bytes());
            let _ = writer.write_all(b"\n");
        }
    }

    fn flush(&self) {
        if let Some(writer) = self.writer.lock().as_mut() {
            let _ = writer.flush();
        }
    }

    fn close(&self) {
        if let Some(mut writer) = self.writer.lock().take() {
            let _ = writer.flush();
        }
    }

    fn trace_event(
        &self,
        cache: Option<&EventCache>,
        source: &str,
        kind: EventKind,
        id: i32,
        message: Option<&str>,
    ) {
        self.emit(
            cache,
            source,
            kind,
            id,
            Payload::Text(message.unwrap_or("")),
            None,
        );
    }

    fn trace_data(
        &self,
        cache: Option<&EventCache>,
        source: &str,
        kind: EventKind,
        id: i32,
        items: &[TraceData],
    ) {
        self.emit(cache, source, kind, id, Payload::Items(items), None);
    }

    fn trace_transfer(
        &self,
        cache: Option<&EventCache>,
        source: &str,
        id: i32,
        message: &str,
        related: ActivityId,
    ) {
        self.emit(
            cache,
            source,
            EventKind::Transfer,
            id,
            Payload::Text(message),
            Some(related),
        );
    }

    fn fail(&self, message: &str, detail: Option<&str>) {
        let message = match detail {
            Some(detail) => format!("Fail: {message} {detail}"),
            None => format!("Fail: {message}"),
        };

        self.emit(None, "", EventKind::Error, 0, Payload::Text(&message), None);
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
