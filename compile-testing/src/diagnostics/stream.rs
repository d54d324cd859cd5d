//! The captured, tee'd diagnostic log.

use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

#[derive(Default)]
struct StreamState {
    buffer: String,
    output: Option<Box<dyn Write + Send>>,
    verbose: bool,
}

/// Diagnostic log shared by every stage of a run.
///
/// Clones share the same buffer. Every line is appended to the buffer and,
/// when an output stream is attached, written there as well.
#[derive(Clone, Default)]
pub struct MessageStream {
    state: Arc<Mutex<StreamState>>,
}

impl MessageStream {
    /// Creates a stream with no live output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stream tee'd to `output`.
    #[must_use]
    pub fn with_output(output: Box<dyn Write + Send>) -> Self {
        let stream = Self::new();
        stream.set_output(output);
        stream
    }

    /// Attaches a live output stream.
    pub fn set_output(&self, output: Box<dyn Write + Send>) {
        self.state.lock().output = Some(output);
    }

    /// Enables or disables `logging:` lines.
    pub fn set_verbose(&self, verbose: bool) {
        self.state.lock().verbose = verbose;
    }

    /// Returns true if `logging:` lines are recorded.
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.state.lock().verbose
    }

    /// Records a harness log line; dropped unless verbose.
    pub fn log(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::debug!(text = message, "harness log");
        if self.is_verbose() {
            self.append_line(&format!("logging: {message}"));
        }
    }

    /// Records a warning line.
    pub fn warn(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::warn!(text = message, "harness warning");
        self.append_line(&format!("warning: {message}"));
    }

    /// Records an error line.
    pub fn error(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::error!(text = message, "harness error");
        self.append_line(&format!("error: {message}"));
    }

    /// Records raw toolchain output verbatim.
    pub fn append_raw(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let mut state = self.state.lock();
        state.buffer.push_str(text);
        if let Some(output) = state.output.as_mut() {
            if let Err(err) = output.write_all(text.as_bytes()) {
                tracing::warn!(error = %err, "failed to forward toolchain output");
            }
        }
    }

    /// Returns everything recorded so far.
    #[must_use]
    pub fn collect_log(&self) -> String {
        self.state.lock().buffer.clone()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().buffer.is_empty()
    }

    /// Flushes the live output stream, if any.
    pub fn flush(&self) {
        if let Some(output) = self.state.lock().output.as_mut() {
            if let Err(err) = output.flush() {
                tracing::warn!(error = %err, "failed to flush diagnostic output");
            }
        }
    }

    fn append_line(&self, line: &str) {
        let mut text = String::with_capacity(line.len() + 1);
        text.push_str(line);
        text.push('\n');
        self.append_raw(&text);
    }
}

impl fmt::Debug for MessageStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MessageStream")
            .field("len", &state.buffer.len())
            .field("verbose", &state.verbose)
            .field("tee", &state.output.is_some())
            .finish()
    }
}
