//! Per-request metadata and the finalize-once logic.

use chrono::{DateTime, FixedOffset, Local, Utc};
use http::StatusCode;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::format::LogLine;
use crate::{ApacheLogConfig, LogSink};

/// Everything needed to produce the log line for one request.
///
/// A record is created when a request starts and writes exactly one line to
/// its sink: on the first call to [`finish`](RequestRecord::finish), or, if
/// that never happens, when the record is dropped. Dropping covers requests
/// whose handler returned early through a panic or whose response body was
/// abandoned mid-stream.
#[derive(Debug)]
pub struct RequestRecord {
    out: LogSink,
    utc: bool,

    start: Instant,

    client_ip: String,
    method: String,
    uri: String,
    protocol: String,
    status: StatusCode,
    bytes: u64,
    end_time: Option<DateTime<FixedOffset>>,
    elapsed: Duration,
}

impl RequestRecord {
    /// Start a record for a request. The status defaults to `200 OK`.
    pub fn start(
        out: LogSink,
        config: &ApacheLogConfig,
        client_ip: impl Into<String>,
        method: impl Into<String>,
        uri: impl Into<String>,
        protocol: impl Into<String>,
    ) -> Self {
        Self {
            out,
            utc: config.utc,
            start: Instant::now(),
            client_ip: client_ip.into(),
            method: method.into(),
            uri: uri.into(),
            protocol: protocol.into(),
            status: StatusCode::OK,
            bytes: 0,
            end_time: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn add_bytes(&mut self, n: usize) {
        self.bytes += n as u64;
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Whether the log line has already been written.
    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// Time at which the record was finished, if it has been.
    pub fn end_time(&self) -> Option<DateTime<FixedOffset>> {
        self.end_time
    }

    /// Stamp the end time and write the log line. Later calls do nothing.
    ///
    /// Failing to write to the sink is reported as a `tracing` warning and
    /// otherwise ignored.
    pub fn finish(&mut self) {
        if self.is_finished() {
            return;
        }
        self.elapsed = self.start.elapsed();
        let end_time = if self.utc {
            Utc::now().fixed_offset()
        } else {
            Local::now().fixed_offset()
        };
        self.end_time = Some(end_time);

        let line = LogLine {
            client_ip: &self.client_ip,
            time: &end_time,
            method: &self.method,
            uri: &self.uri,
            protocol: &self.protocol,
            status: self.status.as_u16(),
            bytes: self.bytes,
            elapsed: self.elapsed,
        }
        .render();

        debug!(status = %self.status, bytes = self.bytes, "Writing access log line");
        if let Err(e) = self.out.write_line(line.as_bytes()) {
            warn!(error = %e, uri = %self.uri, "Failed to write access log line");
        }
    }
}

impl Drop for RequestRecord {
    fn drop(&mut self) {
        self.finish();
    }
}
