//! Sinks — the downstream consumers of [`Event`]s.
//!
//! The orchestrator calls [`Sink::consume`] once per event, in file order,
//! from the sink's own task, and [`Sink::flush`] once after the last event.
//! Durability and retries are the sink's own business; the pipeline never
//! re-delivers an event whose `consume` failed.
//!
//! | Sink                  | Output                                         |
//! |-----------------------|------------------------------------------------|
//! | [`JsonLinesSink`]     | one JSON object per event (stdout by default)  |
//! | [`LineProtocolSink`]  | one InfluxDB line-protocol record per event    |

use std::future::Future;
use std::path::Path;

use loglift_core::Event;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Failure reported by a sink for one event (or for the final flush).
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("event rejected: {0}")]
    Rejected(String),
}

/// Consumer contract for parsed events.
pub trait Sink: Send {
    /// Accept one event.
    fn consume(&mut self, event: Event) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Push out anything buffered. Called once when the pipeline drains.
    fn flush(&mut self) -> impl Future<Output = Result<(), SinkError>> + Send {
        async { Ok(()) }
    }
}

// ---------------------------------------------------------------------------
// JSON lines
// ---------------------------------------------------------------------------

/// Prints each event as a single-line JSON object.
pub struct JsonLinesSink<W> {
    out: W,
}

impl JsonLinesSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W> Sink for JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn consume(&mut self, event: Event) -> Result<(), SinkError> {
        let mut line = event.to_json().to_string();
        line.push('\n');
        self.out.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.out.flush().await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// InfluxDB line protocol
// ---------------------------------------------------------------------------

/// Writes events as InfluxDB line protocol:
///
/// ```text
/// nginx_log,Path=/foo,Method=GET,Scheme=http,Status=200 UpstreamTime=0.001,RequestTime=0.002,BytesSent=612i 1610251200000000000
/// ```
///
/// Output is buffered; records reach the writer on [`Sink::flush`] or when the
/// buffer fills.
pub struct LineProtocolSink<W> {
    measurement: String,
    out: BufWriter<W>,
}

impl LineProtocolSink<tokio::fs::File> {
    /// Append to (or create) the file at `path`.
    pub async fn create(path: impl AsRef<Path>, measurement: impl Into<String>) -> std::io::Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self::new(file, measurement))
    }
}

impl<W> LineProtocolSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(out: W, measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            out: BufWriter::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W> Sink for LineProtocolSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn consume(&mut self, event: Event) -> Result<(), SinkError> {
        let mut record = render_line_protocol(&self.measurement, &event)?;
        record.push('\n');
        self.out.write_all(record.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.out.flush().await?;
        Ok(())
    }
}

/// Render one event as a line-protocol record (without trailing newline).
pub fn render_line_protocol(measurement: &str, event: &Event) -> Result<String, SinkError> {
    let nanos = event
        .timestamp
        .timestamp_nanos_opt()
        .ok_or_else(|| SinkError::Rejected(format!("timestamp {} out of range", event.timestamp)))?;

    let mut out = escape(measurement, &[',', ' ']);
    for (key, value) in [
        ("Path", &event.path),
        ("Method", &event.method),
        ("Scheme", &event.scheme),
        ("Status", &event.status),
    ] {
        // empty tag values are not representable
        if value.is_empty() {
            continue;
        }
        out.push(',');
        out.push_str(key);
        out.push('=');
        out.push_str(&escape(value, &[',', '=', ' ']));
    }
    out.push_str(&format!(
        " UpstreamTime={},RequestTime={},BytesSent={}i {}",
        event.upstream_time, event.request_time, event.bytes_sent, nanos
    ));
    Ok(out)
}

fn escape(raw: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
