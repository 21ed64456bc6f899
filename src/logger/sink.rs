//! Output sinks for rendered lines.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Standard stream a line is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Receives rendered log lines. Writes are best-effort and must not panic.
pub trait LogSink: Send + Sync {
    fn write_line(&self, stream: Stream, line: &str);
}

/// Writes to the process's standard output and error streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_line(&self, stream: Stream, line: &str) {
        let result = match stream {
            Stream::Stdout => writeln!(io::stdout().lock(), "{}", line),
            Stream::Stderr => writeln!(io::stderr().lock(), "{}", line),
        };
        if let Err(e) = result {
            tracing::trace!(error = %e, "Dropped log line");
        }
    }
}

/// A line captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    pub stream: Stream,
    pub text: String,
}

/// Keeps lines in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<CapturedLine>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every captured line in emission order.
    pub fn lines(&self) -> Vec<CapturedLine> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Text of the lines written to one stream.
    pub fn texts(&self, stream: Stream) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.stream == stream)
            .map(|l| l.text)
            .collect()
    }

    pub fn stdout(&self) -> Vec<String> {
        self.texts(Stream::Stdout)
    }

    pub fn stderr(&self) -> Vec<String> {
        self.texts(Stream::Stderr)
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, stream: Stream, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CapturedLine {
                stream,
                text: line.to_string(),
            });
    }
}
