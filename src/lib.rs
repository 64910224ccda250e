//! loglift — tail a growing access log and ship structured events.
//!
//! This crate wires the pieces together. The event model, parser and config
//! live in `loglift-core`; followers live in `loglift-feeds`.
//!
//! # Architecture
//!
//! ```text
//! FileFollower ──► AccessLogParser ──► Sink
//!   (task)            (task)           (task)
//! ```
//!
//! Stages run as independent `tokio` tasks joined by `flume` channels; see
//! [`pipeline`] for the backpressure and shutdown rules.

pub mod pipeline;
pub mod sink;

pub use loglift_core::{AccessLogParser, Config, Event, FieldPolicy, ParseFailure, RawLine};
pub use loglift_feeds::{FileFollower, Follower, MemoryFollower};
pub use pipeline::{Pipeline, PipelineError, PipelineOptions, PipelineStats};
pub use sink::{JsonLinesSink, LineProtocolSink, Sink, SinkError};

use anyhow::Context;
use loglift_core::config::SinkKind;
use tokio_util::sync::CancellationToken;

/// Build the pipeline described by `config` around a [`FileFollower`] and run
/// it until `cancel` fires.
pub async fn run(config: &Config, cancel: CancellationToken) -> anyhow::Result<PipelineStats> {
    config.validate()?;

    let parser = AccessLogParser::new(&config.parser).context("building parser")?;
    let follower = FileFollower::open(&config.source.path, config.source.poll_interval()).await?;
    let options = PipelineOptions::from(&config.pipeline);

    tracing::info!(
        path = %config.source.path.display(),
        timezone = %config.parser.timezone,
        sink = ?config.sink.kind,
        "following access log"
    );

    let stats = match config.sink.kind {
        SinkKind::Stdout => {
            Pipeline::new(follower, parser, JsonLinesSink::stdout(), options)
                .run(cancel)
                .await?
        }
        SinkKind::LineProtocol => {
            let path = config
                .sink
                .path
                .as_deref()
                .context("sink.path is required for the line_protocol sink")?;
            let sink = LineProtocolSink::create(path, config.sink.measurement.clone())
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            Pipeline::new(follower, parser, sink, options).run(cancel).await?
        }
    };
    Ok(stats)
}
