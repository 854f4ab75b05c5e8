//! Response writer that records what passes through it.

use http::{HeaderMap, StatusCode};
use std::io;

use crate::error::HijackError;
use crate::record::RequestRecord;
use crate::response::ResponseWriter;
use crate::types::Connection;

/// A [`ResponseWriter`] that forwards to a real writer while recording the
/// status and body size into a [`RequestRecord`].
///
/// Handlers see it as an ordinary response writer. A successful
/// [`hijack`](ResponseWriter::hijack) finishes the record on the spot, since
/// nothing the handler does with the raw connection afterwards is visible.
pub struct RecordingWriter<'a> {
    inner: &'a mut dyn ResponseWriter,
    record: RequestRecord,
}

impl<'a> RecordingWriter<'a> {
    pub fn new(inner: &'a mut dyn ResponseWriter, record: RequestRecord) -> Self {
        Self { inner, record }
    }

    pub fn record(&self) -> &RequestRecord {
        &self.record
    }

    /// Finish the record if a hijack hasn't already.
    pub fn finish(&mut self) {
        self.record.finish();
    }
}

impl ResponseWriter for RecordingWriter<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.record.add_bytes(written);
        Ok(written)
    }

    fn write_header(&mut self, status: StatusCode) {
        self.record.set_status(status);
        self.inner.write_header(status);
    }

    fn hijack(&mut self) -> Result<Connection, HijackError> {
        let conn = self.inner.hijack()?;
        self.record.finish();
        Ok(conn)
    }
}
