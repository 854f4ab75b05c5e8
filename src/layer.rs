//! Tower middleware writing one access log line per request.

use axum::{
    body::Body,
    extract::{ConnectInfo, OriginalUri, Request},
    response::Response,
};
use http::StatusCode;
use std::{
    future::Future,
    net::SocketAddr,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service};
use tracing::{debug, instrument};

use crate::body::CountingBody;
use crate::format::{client_ip, UNKNOWN_CLIENT};
use crate::record::RequestRecord;
use crate::types::{protocol, request_target, RemoteAddr};
use crate::{ApacheLogConfig, LogSink};

/// Tower layer that logs each request in the Apache common log format.
///
/// The client address comes from axum's [`ConnectInfo<SocketAddr>`] when the
/// app is served with `into_make_service_with_connect_info`, otherwise from a
/// [`RemoteAddr`] request extension, otherwise it is logged as `-`.
///
/// # Examples
///
/// ```rust
/// use apachelog::{ApacheLogConfig, ApacheLogLayer, LogSink};
/// use axum::{routing::get, Router};
///
/// # async fn hello() -> &'static str { "Hello" }
/// let app: Router = Router::new()
///     .route("/hello", get(hello))
///     .layer(ApacheLogLayer::with_config(
///         LogSink::stderr(),
///         ApacheLogConfig { utc: true },
///     ));
/// ```
#[derive(Clone, Debug)]
pub struct ApacheLogLayer {
    out: LogSink,
    config: ApacheLogConfig,
}

impl ApacheLogLayer {
    /// Log to `out` with the default configuration.
    pub fn new(out: LogSink) -> Self {
        Self::with_config(out, ApacheLogConfig::default())
    }

    /// Log to `out` with a custom [`ApacheLogConfig`].
    pub fn with_config(out: LogSink, config: ApacheLogConfig) -> Self {
        Self { out, config }
    }
}

impl<S> Layer<S> for ApacheLogLayer {
    type Service = ApacheLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApacheLogService {
            inner,
            out: self.out.clone(),
            config: self.config.clone(),
        }
    }
}

/// Service produced by [`ApacheLogLayer`].
///
/// The line is written when the response body has been fully sent or is
/// dropped. Responses with status `101 Switching Protocols` hand the
/// connection over to an upgrade and are logged as soon as the response head
/// is produced. Bytes are counted as the server pulls them from the body, so
/// responses whose body is never polled, such as replies to `HEAD`, are
/// logged with 0 bytes. If the inner service fails, the line is written with
/// whatever was recorded (status `200`, no bytes) and the error is returned
/// unchanged.
#[derive(Clone, Debug)]
pub struct ApacheLogService<S> {
    inner: S,
    out: LogSink,
    config: ApacheLogConfig,
}

fn remote_addr(request: &Request) -> String {
    let extensions = request.extensions();
    if let Some(ConnectInfo(addr)) = extensions.get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    match extensions.get::<RemoteAddr>() {
        Some(RemoteAddr(addr)) => client_ip(addr).to_owned(),
        None => UNKNOWN_CLIENT.to_owned(),
    }
}

/// The URI the client asked for, before any `Router::nest` prefix stripping.
fn request_uri(request: &Request) -> String {
    let uri = match request.extensions().get::<OriginalUri>() {
        Some(OriginalUri(original)) => original,
        None => request.uri(),
    };
    request_target(uri, request.version())
}

impl<S> Service<Request> for ApacheLogService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    #[instrument(skip_all)]
    fn call(&mut self, request: Request) -> Self::Future {
        let mut record = RequestRecord::start(
            self.out.clone(),
            &self.config,
            remote_addr(&request),
            request.method().as_str(),
            request_uri(&request),
            protocol(request.version()),
        );

        let future = self.inner.call(request);

        Box::pin(async move {
            // On error `record` is dropped here, which writes its line.
            let mut response = future.await?;
            record.set_status(response.status());

            if response.status() == StatusCode::SWITCHING_PROTOCOLS {
                debug!("Connection upgraded, logging at response head");
                record.finish();
                return Ok(response);
            }

            let body = std::mem::replace(response.body_mut(), Body::empty());
            *response.body_mut() = Body::new(CountingBody::new(body, record));
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_remote_addr_prefers_connect_info() {
        let mut request = Request::new(Body::empty());
        request
            .extensions_mut()
            .insert(RemoteAddr("10.9.8.7:1234".to_string()));
        assert_eq!(remote_addr(&request), "10.9.8.7");

        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4000))));
        assert_eq!(remote_addr(&request), "192.0.2.1");
    }

    #[test]
    fn test_remote_addr_ipv6_connect_info() {
        let mut request = Request::new(Body::empty());
        let addr: SocketAddr = "[::1]:44092".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(remote_addr(&request), "::1");
    }

    #[test]
    fn test_request_uri_prefers_original_uri() {
        let mut request = Request::new(Body::empty());
        *request.uri_mut() = "/hello".parse().unwrap();
        assert_eq!(request_uri(&request), "/hello");

        request
            .extensions_mut()
            .insert(OriginalUri("/api/hello?q=1".parse().unwrap()));
        assert_eq!(request_uri(&request), "/api/hello?q=1");
    }

    #[test]
    fn test_request_uri_http2_drops_authority() {
        let mut request = Request::new(Body::empty());
        *request.uri_mut() = "http://example.com/hello".parse().unwrap();
        *request.version_mut() = http::Version::HTTP_2;
        assert_eq!(request_uri(&request), "/hello");
    }

    #[test]
    fn test_remote_addr_unknown() {
        let request = Request::new(Body::from(Bytes::from_static(b"body")));
        assert_eq!(remote_addr(&request), "-");
    }
}
