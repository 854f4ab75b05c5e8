//! # apachelog
//!
//! Request logging in the Apache common log format, with the response time
//! in seconds appended (the variant used by Rack's `CommonLogger`):
//!
//! ```text
//! 203.0.113.5 - - [16/Oct/2026 14:03:12] "GET /hello HTTP/1.1" 200 13 0.0020
//! ```
//!
//! Exactly one line is written per request, including requests whose
//! handler fails, panics, or takes over the connection.
//!
//! Two entry points are provided:
//!
//! - [`ApacheLogHandler`] decorates a synchronous [`Handler`] that writes its
//!   response through a [`ResponseWriter`].
//! - [`ApacheLogLayer`] is a Tower layer for axum routers and other
//!   `tower::Service`s.
//!
//! ## Wrapping a handler
//!
//! ```rust
//! use apachelog::{types::RemoteAddr, ApacheLogHandler, Handler, LogSink, Request, ResponseRecorder, ResponseWriter};
//! use bytes::Bytes;
//! use http::StatusCode;
//!
//! let hello = |w: &mut dyn ResponseWriter, _req: &Request| -> Result<(), apachelog::BoxError> {
//!     w.write_header(StatusCode::OK);
//!     w.write_all(b"Hello, World!")?;
//!     Ok(())
//! };
//! let logged = ApacheLogHandler::new(hello, LogSink::stderr());
//!
//! let mut request = Request::new(Bytes::new());
//! *request.uri_mut() = "/hello".parse().unwrap();
//! request
//!     .extensions_mut()
//!     .insert(RemoteAddr("203.0.113.5:5000".to_string()));
//!
//! let mut response = ResponseRecorder::new();
//! logged.serve(&mut response, &request).unwrap();
//! ```
//!
//! ## Tower layer
//!
//! ```rust,no_run
//! use apachelog::{ApacheLogLayer, LogSink};
//! use axum::{routing::get, Router};
//! use std::net::SocketAddr;
//!
//! async fn hello() -> &'static str {
//!     "Hello, World!"
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .route("/hello", get(hello))
//!         .layer(ApacheLogLayer::new(LogSink::stderr()));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8899").await.unwrap();
//!     axum::serve(
//!         listener,
//!         app.into_make_service_with_connect_info::<SocketAddr>(),
//!     )
//!     .await
//!     .unwrap();
//! }
//! ```

use tracing::instrument;

pub mod error;
pub use error::{BoxError, HijackError};

pub mod format;

pub mod types;
pub use types::{Connection, RemoteAddr, Request};

mod sink;
pub use sink::LogSink;

pub mod record;
pub use record::RequestRecord;

pub mod response;
pub use response::{ResponseRecorder, ResponseWriter};

pub mod proxy;
pub use proxy::RecordingWriter;

pub mod body;

pub mod layer;
pub use layer::{ApacheLogLayer, ApacheLogService};

/// Configuration for the request loggers.
///
/// # Examples
///
/// ```rust
/// use apachelog::ApacheLogConfig;
///
/// // Local time, like Apache
/// let config = ApacheLogConfig::default();
///
/// let config = ApacheLogConfig { utc: true };
/// ```
#[derive(Clone, Debug, Default)]
pub struct ApacheLogConfig {
    /// Render timestamps in UTC instead of the local time zone
    pub utc: bool,
}

/// A synchronous HTTP request handler.
///
/// The handler writes its response through `w`. Closures with the same
/// signature implement this trait.
pub trait Handler: Send + Sync {
    fn serve(&self, w: &mut dyn ResponseWriter, request: &Request) -> Result<(), BoxError>;
}

impl<F> Handler for F
where
    F: Fn(&mut dyn ResponseWriter, &Request) -> Result<(), BoxError> + Send + Sync,
{
    fn serve(&self, w: &mut dyn ResponseWriter, request: &Request) -> Result<(), BoxError> {
        self(w, request)
    }
}

/// A [`Handler`] that logs every request served by the handler it wraps.
///
/// Each request gets a fresh [`RecordingWriter`] around the real response
/// writer. The log line is written when the wrapped handler returns, whether
/// with `Ok` or `Err`, when it panics, or as soon as it successfully hijacks
/// the connection, and never more than once.
///
/// # Examples
///
/// ```rust
/// use apachelog::{ApacheLogConfig, ApacheLogHandler, LogSink, Request, ResponseWriter};
///
/// let not_found = |w: &mut dyn ResponseWriter, _: &Request| -> Result<(), apachelog::BoxError> {
///     w.write_header(http::StatusCode::NOT_FOUND);
///     Ok(())
/// };
///
/// let logged = ApacheLogHandler::with_config(
///     not_found,
///     LogSink::new(std::io::stdout()),
///     ApacheLogConfig { utc: true },
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ApacheLogHandler<H> {
    handler: H,
    out: LogSink,
    config: ApacheLogConfig,
}

impl<H: Handler> ApacheLogHandler<H> {
    /// Wrap `handler`, writing one line per request to `out`.
    pub fn new(handler: H, out: LogSink) -> Self {
        Self::with_config(handler, out, ApacheLogConfig::default())
    }

    /// Wrap `handler` with a custom [`ApacheLogConfig`].
    pub fn with_config(handler: H, out: LogSink, config: ApacheLogConfig) -> Self {
        Self {
            handler,
            out,
            config,
        }
    }

    /// The wrapped handler.
    pub fn inner(&self) -> &H {
        &self.handler
    }
}

impl<H: Handler> Handler for ApacheLogHandler<H> {
    #[instrument(skip_all)]
    fn serve(&self, w: &mut dyn ResponseWriter, request: &Request) -> Result<(), BoxError> {
        let remote = request
            .extensions()
            .get::<RemoteAddr>()
            .map(|addr| format::client_ip(&addr.0))
            .unwrap_or(format::UNKNOWN_CLIENT);

        let record = RequestRecord::start(
            self.out.clone(),
            &self.config,
            remote,
            request.method().as_str(),
            types::request_target(request.uri(), request.version()),
            types::protocol(request.version()),
        );

        // If the handler unwinds, dropping `rec` still writes the line.
        let mut rec = RecordingWriter::new(w, record);
        let result = self.handler.serve(&mut rec, request);
        rec.finish();
        result
    }
}
