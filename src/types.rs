//! Request and connection types shared by the handler and middleware paths.

use bytes::Bytes;
use std::io::{Read, Write};

/// The request type seen by a [`Handler`](crate::Handler).
///
/// The body is fully buffered. The peer address, if the server knows it, is
/// carried as a [`RemoteAddr`] extension.
pub type Request = http::Request<Bytes>;

/// Raw peer address of the connection a request arrived on.
///
/// Insert this into the request extensions to make the address available to
/// the loggers. Typical values look like `127.0.0.1:36341` or `[::1]:44092`,
/// but any string is accepted.
///
/// # Examples
///
/// ```rust
/// use apachelog::{types::RemoteAddr, Request};
/// use bytes::Bytes;
///
/// let mut request = Request::new(Bytes::new());
/// request
///     .extensions_mut()
///     .insert(RemoteAddr("203.0.113.5:5000".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

/// A bidirectional byte stream.
pub trait ReadWrite: Read + Write {}

impl<T: Read + Write + ?Sized> ReadWrite for T {}

/// The raw transport handed out by a successful hijack.
pub type Connection = Box<dyn ReadWrite + Send>;

/// Rendering of a request's HTTP version as it appears in a request line.
pub(crate) fn protocol(version: http::Version) -> String {
    format!("{version:?}")
}

/// The request target as the client sent it on the request line.
///
/// HTTP/2 and HTTP/3 carry scheme and authority in pseudo-headers, so only
/// the path and query are logged for them.
pub(crate) fn request_target(uri: &http::Uri, version: http::Version) -> String {
    match (version, uri.path_and_query()) {
        (http::Version::HTTP_2 | http::Version::HTTP_3, Some(pq)) => pq.as_str().to_owned(),
        _ => uri.to_string(),
    }
}
