//! Parser — turns one [`RawLine`] into a typed [`Event`] or a [`ParseFailure`].
//!
//! The accepted format is a fixed, positional access-log layout:
//!
//! ```text
//! <client> <ident> <auth> [<time_local>] <scheme> "<METHOD> <TARGET> <PROTOCOL>" <status> <bytes> "<referrer>" "<user-agent>" "<forwarded-for>" <upstream-time> <request-time> <trailer>
//! ```
//!
//! Example:
//!
//! ```text
//! 127.0.0.1 - - [10/Jan/2021:12:00:00 +0000] http "GET /foo?query=t HTTP/1.0" 200 612 "-" "UA" "-" 0.001 0.002 -
//! ```
//!
//! # Failure policy
//!
//! | Condition                              | Outcome                        |
//! |----------------------------------------|--------------------------------|
//! | grammar does not match                 | drop (`GrammarMismatch`)       |
//! | request line is not three tokens       | drop (`RequestLineMalformed`)  |
//! | target is not a URI reference          | drop (`UriInvalid`)            |
//! | offset other than `+0000`              | same as an unparsable timestamp |
//! | timestamp unparsable                   | zero timestamp, or drop under [`FieldPolicy::Strict`] |
//! | bytes / upstream / request time unparsable | `0`, or drop under [`FieldPolicy::Strict`] |
//!
//! A literal `-` in a numeric column is a placeholder for "no value" and is
//! read as `0` under both policies.
//!
//! The request line is split on single spaces, so `"GET  /foo HTTP/1.0"`
//! (two spaces) is four tokens and is dropped.
//!
//! # Target path
//!
//! The path is taken from the target as written, never resolved against a
//! base: `/a/../b` stays `/a/../b` and `/a\b` keeps its backslash. Percent
//! escapes in the path are decoded (bytes that do not form UTF-8 are
//! replaced), and a malformed escape such as `/foo%zz` rejects the target.
//! The asterisk-form target `*` yields the path `*`; an opaque target
//! (`mailto:x`) or a bare query (`?q`) yields an empty path.

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use regex::Regex;

use crate::config::{FieldPolicy, ParserConfig};
use crate::error::{ConfigError, ParseFailure};
use crate::types::{Event, RawLine};

/// Number of capture groups a matching line must yield.
pub const FIELD_COUNT: usize = 14;

/// Access-log grammar. Fourteen positional groups, in order: client, ident,
/// auth, time_local, scheme, request, status, bytes, referrer, user agent,
/// forwarded-for, upstream time, request time, trailer.
pub const ACCESS_LOG_PATTERN: &str = r#"^([\da-fA-F.:]+)\s+([^ \[]+)\s+([^ \[]+)\s+\[([^\]]+)\]\s+([a-z]+)\s+"([^"]+)"\s+(\d{3})\s+(\d+|-)\s+"([^"]*)"\s+"(.*?)"\s+"([^"]*)"\s+([\d.-]+)\s+([\d.-]+)\s+([\d.-]+)"#;

/// Wall-clock part of `time_local`.
pub const TIME_LOCAL_FORMAT: &str = "%d/%b/%Y:%H:%M:%S";

/// The only offset `time_local` may carry. It is matched as literal text.
pub const TIME_LOCAL_OFFSET: &str = "+0000";

// Capture group indices.
const TIME_LOCAL: usize = 4;
const SCHEME: usize = 5;
const REQUEST: usize = 6;
const STATUS: usize = 7;
const BYTES_SENT: usize = 8;
const UPSTREAM_TIME: usize = 12;
const REQUEST_TIME: usize = 13;

/// Compiled access-log parser. Holds no mutable state; [`parse`](Self::parse)
/// returns the same result for the same input every time.
#[derive(Debug, Clone)]
pub struct AccessLogParser {
    grammar: Regex,
    tz: Tz,
    policy: FieldPolicy,
}

impl AccessLogParser {
    pub fn new(config: &ParserConfig) -> Result<Self, ConfigError> {
        let tz: Tz = config
            .timezone
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone(config.timezone.clone()))?;

        Ok(Self {
            grammar: Regex::new(ACCESS_LOG_PATTERN)?,
            tz,
            policy: config.field_policy,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn field_policy(&self) -> FieldPolicy {
        self.policy
    }

    pub fn parse(&self, line: &RawLine) -> Result<Event, ParseFailure> {
        let text = line.to_text();

        let caps = self
            .grammar
            .captures(&text)
            .ok_or(ParseFailure::GrammarMismatch)?;
        let fields: Vec<&str> = caps
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str())
            .collect();
        if fields.len() != FIELD_COUNT {
            return Err(ParseFailure::GrammarMismatch);
        }
        // fields[] is zero-based, group indices are one-based
        let group = |i: usize| fields[i - 1];

        let timestamp = self.timestamp(group(TIME_LOCAL))?;
        let bytes_sent = self.numeric::<u64>("bytes_sent", group(BYTES_SENT))?;

        let request: Vec<&str> = group(REQUEST).split(' ').collect();
        let [method, target, _protocol] = request.as_slice() else {
            return Err(ParseFailure::RequestLineMalformed {
                tokens: request.len(),
            });
        };

        let path = target_path(target)?;

        let upstream_time = self.numeric::<f64>("upstream_time", group(UPSTREAM_TIME))?;
        let request_time = self.numeric::<f64>("request_time", group(REQUEST_TIME))?;

        Ok(Event {
            timestamp,
            bytes_sent,
            path,
            method: method.to_string(),
            scheme: group(SCHEME).to_string(),
            status: group(STATUS).to_string(),
            upstream_time,
            request_time,
        })
    }

    fn timestamp(&self, raw: &str) -> Result<DateTime<Tz>, ParseFailure> {
        match parse_time_local(raw, self.tz) {
            Some(ts) => Ok(ts),
            None if self.policy == FieldPolicy::Strict => {
                Err(ParseFailure::TimestampInvalid(raw.to_string()))
            }
            None => {
                tracing::warn!(time_local = raw, "unparsable timestamp, using zero value");
                Ok(Event::zero_timestamp(self.tz))
            }
        }
    }

    fn numeric<T>(&self, field: &'static str, raw: &str) -> Result<T, ParseFailure>
    where
        T: std::str::FromStr + Default,
    {
        if raw == "-" {
            return Ok(T::default());
        }
        match raw.parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) if self.policy == FieldPolicy::Strict => Err(ParseFailure::NumericInvalid {
                field,
                value: raw.to_string(),
            }),
            Err(_) => Ok(T::default()),
        }
    }
}

/// Parse `DD/Mon/YYYY:HH:MM:SS +0000` as a wall-clock time in `tz`.
///
/// `+0000` is part of the layout, not a zone designator: the wall clock is
/// local time in `tz`. Any other offset makes the timestamp unparsable.
/// Ambiguous local times (DST fall-back) resolve to the earlier instant;
/// non-existent ones yield `None`.
pub fn parse_time_local(raw: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let wall = raw.strip_suffix(TIME_LOCAL_OFFSET)?.strip_suffix(' ')?;
    let naive = NaiveDateTime::parse_from_str(wall, TIME_LOCAL_FORMAT).ok()?;
    tz.from_local_datetime(&naive).earliest()
}

/// Path component of a request target, as described in the module docs.
pub fn target_path(target: &str) -> Result<String, ParseFailure> {
    let invalid = |reason: &str| ParseFailure::UriInvalid {
        target: target.to_string(),
        reason: reason.to_string(),
    };

    if target.bytes().any(|b| b < 0x20 || b == 0x7f) {
        return Err(invalid("control character"));
    }
    let (rest, fragment) = match target.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (target, None),
    };
    if fragment.is_some_and(|f| percent_decode(f).is_none()) {
        return Err(invalid("malformed percent escape in fragment"));
    }
    if rest == "*" {
        return Ok(rest.to_string());
    }

    let (scheme, rest) = split_scheme(rest).map_err(invalid)?;
    let rest = rest.split_once('?').map_or(rest, |(path, _query)| path);

    let raw_path = match scheme {
        Some(_) if !rest.starts_with('/') => return Ok(String::new()),
        _ if rest.starts_with("//") && (scheme.is_some() || !rest.starts_with("///")) => {
            let authority = &rest[2..];
            let (authority, path) = authority.split_at(authority.find('/').unwrap_or(authority.len()));
            check_authority(authority).map_err(|reason| invalid(&reason))?;
            path
        }
        Some(_) => rest,
        None => {
            let first_segment = rest.split('/').next().unwrap_or_default();
            if first_segment.contains(':') {
                return Err(invalid("first path segment contains a colon"));
            }
            rest
        }
    };

    percent_decode(raw_path).ok_or_else(|| invalid("malformed percent escape in path"))
}

/// Split a leading `scheme:` off `raw`. A target that does not start with a
/// scheme is returned whole.
fn split_scheme(raw: &str) -> Result<(Option<&str>, &str), &'static str> {
    for (i, b) in raw.bytes().enumerate() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' => {}
            b'0'..=b'9' | b'+' | b'-' | b'.' if i > 0 => {}
            b':' if i == 0 => return Err("missing scheme before ':'"),
            b':' => return Ok((Some(&raw[..i]), &raw[i + 1..])),
            _ => break,
        }
    }
    Ok((None, raw))
}

fn check_authority(authority: &str) -> Result<(), String> {
    let host_port = authority.rsplit_once('@').map_or(authority, |(_userinfo, hp)| hp);
    let (host, port) = if host_port.starts_with('[') {
        let end = host_port.find(']').ok_or("missing ']' in host")?;
        let (host, tail) = host_port.split_at(end + 1);
        match tail {
            "" => (host, None),
            _ => (host, Some(tail.strip_prefix(':').ok_or("unexpected text after ']'")?)),
        }
    } else {
        match host_port.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        }
    };
    if port.is_some_and(|p| !p.bytes().all(|b| b.is_ascii_digit())) {
        return Err(format!("invalid port in {authority:?}"));
    }
    if !host.is_empty() {
        url::Host::parse(host).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Decode `%XX` escapes. `None` if an escape is truncated or not hex.
fn percent_decode(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(String::from_utf8_lossy(&out).into_owned())
}
