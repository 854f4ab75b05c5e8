//! Apache common log format rendering.
//!
//! Lines follow the variant of the common log format used by Rack's
//! `CommonLogger`, which appends the response time in seconds:
//!
//! ```text
//! 127.0.0.1 - - [16/Oct/2026 14:03:12] "GET /hello HTTP/1.1" 200 13 0.0020
//! ```

use chrono::{DateTime, FixedOffset};
use std::time::Duration;

/// strftime pattern for the bracketed timestamp field.
pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y %H:%M:%S";

/// Placeholder used when the peer address of a request is unknown.
pub const UNKNOWN_CLIENT: &str = "-";

/// Best-effort extraction of the host part of a `host:port` peer address.
///
/// Bracketed IPv6 hosts lose their brackets. Anything that does not split
/// cleanly into a host and a port is returned verbatim.
///
/// # Examples
///
/// ```rust
/// use apachelog::format::client_ip;
///
/// assert_eq!(client_ip("127.0.0.1:36341"), "127.0.0.1");
/// assert_eq!(client_ip("[::1]:44092"), "::1");
/// assert_eq!(client_ip("unix-socket-id"), "unix-socket-id");
/// ```
pub fn client_ip(remote_addr: &str) -> &str {
    split_host(remote_addr).unwrap_or(remote_addr)
}

fn split_host(addr: &str) -> Option<&str> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        let port = after.strip_prefix(':')?;
        if port.contains([':', '[', ']']) || host.contains('[') {
            return None;
        }
        return Some(host);
    }

    let (host, port) = addr.rsplit_once(':')?;
    // An unbracketed host may not contain colons: "::1" has no port.
    if host.contains([':', '[', ']']) || port.contains([']', '[']) {
        return None;
    }
    Some(host)
}

/// The fields of one log line.
pub(crate) struct LogLine<'a> {
    pub client_ip: &'a str,
    pub time: &'a DateTime<FixedOffset>,
    pub method: &'a str,
    pub uri: &'a str,
    pub protocol: &'a str,
    pub status: u16,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl LogLine<'_> {
    /// Render the line, trailing newline included.
    pub fn render(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} {}\" {} {} {:.4}\n",
            self.client_ip,
            self.time.format(TIMESTAMP_FORMAT),
            self.method,
            self.uri,
            self.protocol,
            self.status,
            self.bytes,
            self.elapsed.as_secs_f64(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_client_ip_ipv4() {
        assert_eq!(client_ip("127.0.0.1:36341"), "127.0.0.1");
        assert_eq!(client_ip("203.0.113.5:5000"), "203.0.113.5");
    }

    #[test]
    fn test_client_ip_ipv6() {
        assert_eq!(client_ip("[::1]:44092"), "::1");
        assert_eq!(client_ip("[fe80::1%eth0]:80"), "fe80::1%eth0");
    }

    #[test]
    fn test_client_ip_hostname() {
        assert_eq!(client_ip("localhost:8080"), "localhost");
        assert_eq!(client_ip("example.com:http"), "example.com");
    }

    #[test]
    fn test_client_ip_falls_back_to_raw_value() {
        assert_eq!(client_ip("unix-socket-id"), "unix-socket-id");
        assert_eq!(client_ip("::1"), "::1");
        assert_eq!(client_ip("[::1]"), "[::1]");
        assert_eq!(client_ip("[::1]44092"), "[::1]44092");
        assert_eq!(client_ip("[::1:44092"), "[::1:44092");
        assert_eq!(client_ip(""), "");
    }

    #[test]
    fn test_render_exact_line() {
        let time = Utc
            .with_ymd_and_hms(2026, 3, 7, 9, 5, 1)
            .unwrap()
            .fixed_offset();
        let line = LogLine {
            client_ip: "203.0.113.5",
            time: &time,
            method: "GET",
            uri: "/hello",
            protocol: "HTTP/1.1",
            status: 200,
            bytes: 13,
            elapsed: Duration::from_millis(2),
        };

        assert_eq!(
            line.render(),
            "203.0.113.5 - - [07/Mar/2026 09:05:01] \"GET /hello HTTP/1.1\" 200 13 0.0020\n"
        );
    }

    #[test]
    fn test_render_elapsed_precision() {
        let time = Utc
            .with_ymd_and_hms(2026, 12, 31, 23, 59, 59)
            .unwrap()
            .fixed_offset();
        let mut line = LogLine {
            client_ip: "::1",
            time: &time,
            method: "POST",
            uri: "/upload?x=1",
            protocol: "HTTP/1.0",
            status: 404,
            bytes: 0,
            elapsed: Duration::from_micros(12_345_600),
        };
        assert!(line.render().ends_with("\" 404 0 12.3456\n"));

        line.elapsed = Duration::ZERO;
        assert!(line.render().ends_with(" 0.0000\n"));
        assert!(line.render().contains("[31/Dec/2026 23:59:59]"));
    }
}
