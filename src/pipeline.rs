//! Pipeline orchestrator — follower, parser and sink as three tasks.
//!
//! ```text
//!  ┌──────────┐  RawLine   ┌────────┐   Event   ┌──────┐
//!  │ Follower │──────────►│ Parser │─────────►│ Sink │
//!  └──────────┘  chan(N)   └────────┘  chan(N)  └──────┘
//! ```
//!
//! Both channels have the same capacity `N`. With the default `N = 0` every
//! send is a rendezvous: a slow sink stalls the parser, which stalls the
//! follower, which stops reading the file. Nothing is buffered and nothing is
//! lost. With `N > 0` each channel queues up to `N` values and a full queue
//! blocks the sender; there is no drop-on-overflow mode.
//!
//! Each stage has exactly one producer and one consumer, so the sink sees
//! events in the order their lines appear in the file.
//!
//! # Shutdown
//!
//! Cancelling the token passed to [`Pipeline::run`] stops the follower. The
//! follower still hands over a line it has already read, then drops its
//! sender; the parser drains, drops its sender; the sink drains and is
//! flushed. The file handle is released when the follower task ends, on every
//! path including a fatal read error.

use loglift_core::config::PipelineConfig;
use loglift_core::{AccessLogParser, Event, RawLine};
use loglift_feeds::{FeedError, Follower};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::sink::{Sink, SinkError};

/// Tunables for [`Pipeline`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Depth of both inter-stage channels; `0` means rendezvous.
    pub channel_capacity: usize,
}

impl From<&PipelineConfig> for PipelineOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            channel_capacity: config.channel_capacity,
        }
    }
}

/// Counters reported when a pipeline finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Complete lines produced by the follower.
    pub lines_read: u64,
    /// Events the parser handed to the sink stage.
    pub events_emitted: u64,
    /// Lines the parser dropped.
    pub lines_dropped: u64,
    /// Events the sink accepted.
    pub events_consumed: u64,
    /// Events the sink rejected.
    pub sink_failures: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The follower failed; the whole pipeline stopped.
    #[error("follower failed: {0}")]
    Feed(#[from] FeedError),

    /// The sink failed to flush during drain.
    #[error("sink failed: {0}")]
    Sink(#[from] SinkError),

    #[error("{stage} stage panicked or was aborted: {source}")]
    StageJoin {
        stage: &'static str,
        source: tokio::task::JoinError,
    },
}

/// A wired follower → parser → sink pipeline, ready to [`run`](Self::run).
pub struct Pipeline<F, S> {
    follower: F,
    parser: AccessLogParser,
    sink: S,
    options: PipelineOptions,
}

impl<F, S> Pipeline<F, S>
where
    F: Follower + 'static,
    S: Sink + 'static,
{
    pub fn new(follower: F, parser: AccessLogParser, sink: S, options: PipelineOptions) -> Self {
        Self {
            follower,
            parser,
            sink,
            options,
        }
    }

    /// Run until `cancel` fires or the follower is exhausted, then drain.
    ///
    /// Returns the stage counters, or the first fatal error: a follower
    /// failure, a sink flush failure, or a panicked stage.
    pub async fn run(self, cancel: CancellationToken) -> Result<PipelineStats, PipelineError> {
        let cap = self.options.channel_capacity;
        let (line_tx, line_rx) = flume::bounded::<RawLine>(cap);
        let (event_tx, event_rx) = flume::bounded::<Event>(cap);

        debug!(channel_capacity = cap, "starting pipeline");

        let follow = tokio::spawn(follow_stage(self.follower, line_tx, cancel));
        let parse = tokio::spawn(parse_stage(self.parser, line_rx, event_tx));
        let consume = tokio::spawn(sink_stage(self.sink, event_rx));

        let (follow, parse, consume) = tokio::join!(follow, parse, consume);

        let follow = follow.map_err(joined("follower"))?;
        let parse = parse.map_err(joined("parser"))?;
        let consume = consume.map_err(joined("sink"))?;

        let lines_read = follow.inspect_err(|e| error!(error = %e, "follower failed"))?;
        let sink = consume?;

        let stats = PipelineStats {
            lines_read,
            events_emitted: parse.emitted,
            lines_dropped: parse.dropped,
            events_consumed: sink.consumed,
            sink_failures: sink.failures,
        };
        info!(
            lines_read = stats.lines_read,
            events_emitted = stats.events_emitted,
            lines_dropped = stats.lines_dropped,
            sink_failures = stats.sink_failures,
            "pipeline drained"
        );
        Ok(stats)
    }
}

fn joined(stage: &'static str) -> impl FnOnce(tokio::task::JoinError) -> PipelineError {
    move |source| PipelineError::StageJoin { stage, source }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

async fn follow_stage<F: Follower>(
    mut follower: F,
    lines: flume::Sender<RawLine>,
    cancel: CancellationToken,
) -> Result<u64, FeedError> {
    let mut read = 0;
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("follower cancelled");
                break;
            }
            next = follower.next_line() => next?,
        };
        let Some(line) = next else {
            debug!("follower exhausted");
            break;
        };
        read += 1;
        if lines.send_async(line).await.is_err() {
            warn!("parser stage stopped, follower exiting");
            break;
        }
    }
    Ok(read)
}

#[derive(Debug, Default)]
struct ParseStats {
    emitted: u64,
    dropped: u64,
}

async fn parse_stage(
    parser: AccessLogParser,
    lines: flume::Receiver<RawLine>,
    events: flume::Sender<Event>,
) -> ParseStats {
    let mut stats = ParseStats::default();
    while let Ok(line) = lines.recv_async().await {
        match parser.parse(&line) {
            Ok(event) => {
                if events.send_async(event).await.is_err() {
                    warn!("sink stage stopped, parser exiting");
                    break;
                }
                stats.emitted += 1;
            }
            Err(failure) => {
                stats.dropped += 1;
                warn!(
                    kind = %failure.kind(),
                    error = %failure,
                    line = %line.to_text(),
                    "dropping line"
                );
            }
        }
    }
    stats
}

#[derive(Debug, Default)]
struct SinkStats {
    consumed: u64,
    failures: u64,
}

async fn sink_stage<S: Sink>(
    mut sink: S,
    events: flume::Receiver<Event>,
) -> Result<SinkStats, SinkError> {
    let mut stats = SinkStats::default();
    while let Ok(event) = events.recv_async().await {
        match sink.consume(event).await {
            Ok(()) => stats.consumed += 1,
            Err(e) => {
                stats.failures += 1;
                error!(error = %e, "sink failed to consume event");
            }
        }
    }
    sink.flush().await?;
    Ok(stats)
}
