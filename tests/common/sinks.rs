//! Sink test doubles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use loglift::{Event, Sink, SinkError};
use tokio::sync::mpsc;

/// Records every event it is given. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<Event>>>,
    flushed: Arc<Mutex<bool>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.events.lock().unwrap().iter().map(|e| e.path.clone()).collect()
    }

    pub fn was_flushed(&self) -> bool {
        *self.flushed.lock().unwrap()
    }
}

impl Sink for CollectingSink {
    async fn consume(&mut self, event: Event) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        *self.flushed.lock().unwrap() = true;
        Ok(())
    }
}

/// Forwards each event to a channel so a test can await arrivals.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Event>,
}

pub fn channel_sink() -> (ChannelSink, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink { tx }, rx)
}

impl Sink for ChannelSink {
    async fn consume(&mut self, event: Event) -> Result<(), SinkError> {
        self.tx
            .send(event)
            .map_err(|_| SinkError::Rejected("receiver dropped".into()))
    }
}

/// Sleeps before accepting each event, to exercise backpressure.
pub struct SlowSink {
    pub delay: Duration,
    pub inner: CollectingSink,
}

impl Sink for SlowSink {
    async fn consume(&mut self, event: Event) -> Result<(), SinkError> {
        tokio::time::sleep(self.delay).await;
        self.inner.consume(event).await
    }
}

/// Fails every flush, to exercise drain error reporting.
pub struct FailingFlushSink;

impl Sink for FailingFlushSink {
    async fn consume(&mut self, _event: Event) -> Result<(), SinkError> {
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        Err(SinkError::Io(std::io::Error::other("disk full")))
    }
}
