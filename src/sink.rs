//! Shared output stream for log lines.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for log lines, shared by every request.
///
/// Cloning a `LogSink` is cheap and every clone writes to the same stream.
/// Each line is written with a single call while holding the sink's lock,
/// so lines from concurrent requests never interleave.
///
/// # Examples
///
/// ```rust
/// use apachelog::LogSink;
///
/// let to_stderr = LogSink::stderr();
/// let to_file = LogSink::new(std::io::sink());
/// ```
#[derive(Clone)]
pub struct LogSink {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl LogSink {
    /// Create a sink writing to `out`.
    pub fn new<W: Write + Send + 'static>(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
        }
    }

    /// Create a sink writing to the process's standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Write one complete line and flush it.
    pub(crate) fn write_line(&self, line: &[u8]) -> io::Result<()> {
        // A panic elsewhere while holding the lock can't leave a line
        // half-written, so the stream is still usable.
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(line)?;
        out.flush()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::stderr()
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink").finish_non_exhaustive()
    }
}
