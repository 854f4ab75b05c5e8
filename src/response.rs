//! The response-writing interface handed to handlers.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use std::io;
use tracing::warn;

use crate::error::HijackError;
use crate::types::Connection;

/// Channel through which a [`Handler`](crate::Handler) produces its response.
///
/// Status and headers go out with the first write or the first call to
/// [`write_header`](ResponseWriter::write_header); a write without a prior
/// `write_header` implies `200 OK`.
///
/// Taking over the raw connection is an optional capability. Writers that
/// cannot do it keep the default [`hijack`](ResponseWriter::hijack), which
/// fails with [`HijackError::NotSupported`].
pub trait ResponseWriter {
    /// Response headers. Changes after the header is written have no effect.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Write part of the body, returning how many bytes were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Send the response status.
    fn write_header(&mut self, status: StatusCode);

    /// Take over the underlying connection.
    ///
    /// After a successful hijack the writer must no longer be used to send a
    /// response; the caller owns the connection.
    fn hijack(&mut self) -> Result<Connection, HijackError> {
        Err(HijackError::NotSupported)
    }

    /// Write the whole buffer, retrying on partial writes.
    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => buf = &buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// In-memory [`ResponseWriter`] that buffers the whole response.
///
/// Useful for tests and for turning a handler's output into an
/// [`http::Response`]. It does not support hijacking.
///
/// # Examples
///
/// ```rust
/// use apachelog::{ResponseRecorder, ResponseWriter};
/// use http::StatusCode;
///
/// let mut recorder = ResponseRecorder::new();
/// recorder.write_header(StatusCode::CREATED);
/// recorder.write_all(b"done").unwrap();
///
/// let response = recorder.into_response();
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(response.body(), "done");
/// ```
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The status sent so far, `200 OK` if none was.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_response(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(Bytes::from(self.body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for ResponseRecorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.status.get_or_insert(StatusCode::OK);
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn write_header(&mut self, status: StatusCode) {
        match self.status {
            Some(sent) => warn!(%sent, ignored = %status, "Superfluous write_header call"),
            None => self.status = Some(status),
        }
    }
}
