//! Core types for loglift-core.
//!
//! This module defines the two values that travel through the pipeline: the
//! [`RawLine`] handed from the follower to the parser, and the structured
//! [`Event`] handed from the parser to the sink.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

// ---------------------------------------------------------------------------
// RawLine
// ---------------------------------------------------------------------------

/// One newline-delimited record read from the followed file.
///
/// The terminating `\n` (and a `\r` directly before it) is stripped on
/// construction. A `RawLine` is consumed exactly once by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine(Vec<u8>);

impl RawLine {
    pub fn new(mut bytes: Vec<u8>) -> Self {
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The line as UTF-8 text; invalid sequences are replaced.
    pub fn to_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<&str> for RawLine {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes().to_vec())
    }
}

impl From<String> for RawLine {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl From<Vec<u8>> for RawLine {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A structured access-log record, built fresh for every successfully parsed
/// line and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Request time, in the parser's configured timezone. Set to
    /// [`Event::zero_timestamp`] when the source text could not be parsed
    /// under the lenient field policy.
    pub timestamp: DateTime<Tz>,
    /// Response body size in bytes.
    pub bytes_sent: u64,
    /// Path component of the request target; query and fragment stripped.
    pub path: String,
    /// First token of the request line.
    pub method: String,
    /// Scheme token captured separately from the request line.
    pub scheme: String,
    /// Three-digit status code, kept as text.
    pub status: String,
    /// Upstream response time in seconds.
    pub upstream_time: f64,
    /// Total request time in seconds.
    pub request_time: f64,
}

impl Event {
    /// The placeholder timestamp used when a line's timestamp is unparsable:
    /// the Unix epoch, expressed in `tz`.
    pub fn zero_timestamp(tz: Tz) -> DateTime<Tz> {
        DateTime::<Utc>::UNIX_EPOCH.with_timezone(&tz)
    }

    /// Whether the timestamp is the degraded placeholder.
    pub fn has_zero_timestamp(&self) -> bool {
        self.timestamp.timestamp() == 0 && self.timestamp.timestamp_subsec_nanos() == 0
    }

    /// JSON rendering used by the print sink. The timestamp is RFC 3339 with
    /// the timezone's offset at that instant.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "bytes_sent": self.bytes_sent,
            "path": self.path,
            "method": self.method,
            "scheme": self.scheme,
            "status": self.status,
            "upstream_time": self.upstream_time,
            "request_time": self.request_time,
        })
    }
}
