//! Response body wrapper that counts bytes as they stream out.
//!
//! Frames pass through untouched, so size hints and end-of-stream signals of
//! the wrapped body still reach the server.

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::error;

use crate::record::RequestRecord;

/// A body that adds the length of every data frame to a [`RequestRecord`]
/// and finishes the record when the stream ends.
///
/// A body dropped before the end (client went away, server shut down) still
/// finishes the record, with the bytes counted up to that point.
pub struct CountingBody<B> {
    inner: B,
    record: RequestRecord,
}

impl<B> CountingBody<B> {
    pub fn new(inner: B, record: RequestRecord) -> Self {
        Self { inner, record }
    }

    pub fn record(&self) -> &RequestRecord {
        &self.record
    }
}

impl<B> Body for CountingBody<B>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: fmt::Display,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.record.add_bytes(data.len());
                }
            }
            Poll::Ready(Some(Err(e))) => {
                error!(error = %e, "Stream error in response body");
            }
            Poll::Ready(None) => this.record.finish(),
            Poll::Pending => {}
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
