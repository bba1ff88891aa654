use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use parking_lot::Mutex;

use super::{ListenerState, TraceListener, TraceOptions};

/// Writes plain text to any byte sink.
///
/// This is the default listener shape: events go through the shared header
/// and footer layout from the provided trait methods, and `write` applies
/// the listener's indentation at line starts. I/O errors are swallowed;
/// after [`close`](TraceListener::close) every write is a no-op.
pub struct TextListener<W: io::Write + Send> {
    state: ListenerState,
    writer: Mutex<Option<W>>,
}

impl TextListener<io::Stdout> {
    /// The stdout fallback destination.
    pub fn stdout(name: impl Into<String>) -> Self {
        TextListener::new(name, io::stdout())
    }
}

impl TextListener<File> {
    /// Open (or create) a file destination in append mode.
    pub fn append(name: impl Into<String>, path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(TextListener::new(name, file))
    }
}

impl<W: io::Write + Send> TextListener<W> {
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        TextListener {
            state: ListenerState::new(name),
            writer: Mutex::new(Some(writer)),
        }
    }

    pub fn with_options(self, options: TraceOptions) -> Self {
        self.state.set_options(options);

        self
    }
}

impl<W: io::Write + Send> TraceListener for TextListener<W> {
    fn state(&self) -> &ListenerState {
        &self.state
    }

    fn write(&self, text: &str) {
        let mut guard = self.writer.lock();

        let Some(writer) = guard.as_mut() else {
            return;
        };

        if self.state.take_needs_indent() {
            let _ = writer.write_all(self.state.indent_text().as_bytes());
        }

        let _ = writer.write_all(text.as_bytes());
    }

    fn write_line(&self, text: &str) {
        self.write(text);

        let mut guard = self.writer.lock();

        if let Some(writer) = guard.as_mut() {
            let _ = writer.write_all(b"\n");
            self.state.set_needs_indent(true);
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
}
