use std::io;

use super::{join_ids, text::TextListener, ListenerState, TraceListener, TraceOptions};
use crate::{
    cache::EventCache,
    data::{self, TraceData},
    level::EventKind,
    platform,
};

/// Field count of every record. Each field, including the last, is followed
/// by the delimiter, so a record always carries exactly this many
/// delimiters.
const FIELDS: usize = 10;

const FIELD_SOURCE: usize = 0;
const FIELD_KIND: usize = 1;
const FIELD_ID: usize = 2;
const FIELD_MESSAGE: usize = 3;
const FIELD_OPERATION_STACK: usize = 4;
const FIELD_PROCESS_ID: usize = 5;
const FIELD_THREAD_ID: usize = 6;
const FIELD_DATE_TIME: usize = 7;
const FIELD_TIMESTAMP: usize = 8;
const FIELD_CALLSTACK: usize = 9;

/// Writes one delimiter-separated record per event.
///
/// Fields after the message are present in every record but stay empty
/// unless a cache was supplied and the matching option bit is set. A field
/// containing the delimiter, a double quote, or a line break is wrapped in
/// double quotes with embedded quotes doubled.
pub struct DelimitedListener<W: io::Write + Send> {
    inner: TextListener<W>,
    delimiter: String,
}

impl<W: io::Write + Send> DelimitedListener<W> {
    /// A listener with the default `;` delimiter.
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        DelimitedListener {
            inner: TextListener::new(name, writer),
            delimiter: ";".into(),
        }
    }

    /// Replace the delimiter. An empty delimiter would make every record
    /// unsplittable, so it falls back to the default.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        let delimiter = delimiter.into();

        if !delimiter.is_empty() {
            self.delimiter = delimiter;
        }

        self
    }

    pub fn with_options(self, options: TraceOptions) -> Self {
        self.inner.state().set_options(options);

        self
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    fn escape(&self, field: &str) -> String {
        let must_quote = field.contains(self.delimiter.as_str())
            || field.contains('"')
            || field.contains('\n')
            || field.contains('\r');

        if must_quote {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.into()
        }
    }

    fn write_record(&self, fields: &[String; FIELDS]) {
        let mut line = String::new();

        for field in fields {
            line.push_str(&self.escape(field));
            line.push_str(&self.delimiter);
        }

        self.inner.write_line(&line);
    }

    fn event_fields(
        &self,
        cache: Option<&EventCache>,
        source: &str,
        kind: EventKind,
        id: i32,
        message: String,
    ) -> [String; FIELDS] {
        let mut fields: [String; FIELDS] = std::array::from_fn(|_| String::new());

        fields[FIELD_SOURCE] = source.into();
        fields[FIELD_KIND] = kind.to_string();
        fields[FIELD_ID] = id.to_string();
        fields[FIELD_MESSAGE] = message;

        if let Some(cache) = cache {
            let options = self.options();

            if options.contains(TraceOptions::LOGICAL_OPERATION_STACK) {
                fields[FIELD_OPERATION_STACK] = join_ids(cache.logical_operation_stack());
            }

            if options.contains(TraceOptions::PROCESS_ID) {
                fields[FIELD_PROCESS_ID] = cache.process_id().to_string();
            }

            if options.contains(TraceOptions::THREAD_ID) {
                fields[FIELD_THREAD_ID] = cache.thread_id().to_string();
            }

            if options.contains(TraceOptions::DATE_TIME) {
                fields[FIELD_DATE_TIME] = platform::rfc3339(cache.date_time());
            }

            if options.contains(TraceOptions::TIMESTAMP) {
                fields[FIELD_TIMESTAMP] = cache.timestamp().to_string();
            }

            if options.contains(TraceOptions::CALLSTACK) {
                fields[FIELD_CALLSTACK] = cache.callstack().into();
            }
        }

        fields
    }
}

impl<W: io::Write + Send> TraceListener for DelimitedListener<W> {
    fn state(&self) -> &ListenerState {
        self.inner.state()
    }

    fn write(&self, text: &str) {
        self.inner.write(text);
    }

    /// Every line is a full record: the text lands in the first field and
    /// the blank trailing skeleton is always appended.
    fn write_line(&self, text: &str) {
        let mut fields: [String; FIELDS] = std::array::from_fn(|_| String::new());
        fields[FIELD_SOURCE] = text.into();

        self.write_record(&fields);
    }

    fn flush(&self) {
        self.inner.flush();
    }

    fn close(&self) {
        self.inner.close();
    }

    fn trace_event(
        &self,
        cache: Option<&EventCache>,
        source: &str,
        kind: EventKind,
        id: i32,
        message: Option<&str>,
    ) {
        let fields =
            self.event_fields(cache, source, kind, id, message.unwrap_or("").into());

        self.write_record(&fields);
    }

    fn trace_data(
        &self,
        cache: Option<&EventCache>,
        source: &str,
        kind: EventKind,
        id: i32,
        items: &[TraceData],
    ) {
        let fields = self.event_fields(cache, source, kind, id, data::join(items, ", "));

        self.write_record(&fields);
    }
}
