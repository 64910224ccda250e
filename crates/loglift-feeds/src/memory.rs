//! In-memory follower, fed through a channel.
//!
//! Writers push arbitrary byte chunks; the follower splits them on `\n`
//! exactly as the file follower would, holding back any unterminated tail.
//! When every [`MemoryWriter`] is dropped the follower drains what it has and
//! then reports exhaustion. An unterminated tail at that point is discarded.

use std::collections::VecDeque;

use tokio::sync::mpsc;

use crate::{FeedError, Follower, RawLine};

/// Create a connected writer/follower pair.
///
/// ```rust
/// let (writer, follower) = loglift_feeds::memory_feed();
/// writer.write_line("hello");
/// drop(writer);
/// ```
pub fn memory_feed() -> (MemoryWriter, MemoryFollower) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MemoryWriter { tx }, MemoryFollower::new(rx))
}

/// Write half of [`memory_feed`]. Cloneable; the feed closes when the last
/// clone is dropped.
#[derive(Clone)]
pub struct MemoryWriter {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl MemoryWriter {
    /// Append raw bytes. Returns `false` if the follower is gone.
    pub fn write(&self, bytes: impl Into<Vec<u8>>) -> bool {
        self.tx.send(bytes.into()).is_ok()
    }

    /// Append `line` followed by a newline.
    pub fn write_line(&self, line: &str) -> bool {
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
        self.write(bytes)
    }
}

pub struct MemoryFollower {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    pending: Vec<u8>,
    ready: VecDeque<RawLine>,
}

impl MemoryFollower {
    fn new(rx: mpsc::UnboundedReceiver<Vec<u8>>) -> Self {
        Self {
            rx,
            pending: Vec::new(),
            ready: VecDeque::new(),
        }
    }

    /// A follower that yields `lines` and is then exhausted.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (writer, follower) = memory_feed();
        for line in lines {
            writer.write_line(line.as_ref());
        }
        follower
    }

    fn split_pending(&mut self) {
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let rest = self.pending.split_off(pos + 1);
            let line = std::mem::replace(&mut self.pending, rest);
            self.ready.push_back(RawLine::new(line));
        }
    }
}

impl Follower for MemoryFollower {
    async fn next_line(&mut self) -> Result<Option<RawLine>, FeedError> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Ok(Some(line));
            }
            match self.rx.recv().await {
                Some(chunk) => {
                    self.pending.extend_from_slice(&chunk);
                    self.split_pending();
                }
                None => {
                    if !self.pending.is_empty() {
                        tracing::debug!(bytes = self.pending.len(), "discarding unterminated tail");
                        self.pending.clear();
                    }
                    return Ok(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn drain(mut follower: MemoryFollower) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = follower.next_line().await.unwrap() {
            out.push(line.to_text().into_owned());
        }
        out
    }

    #[tokio::test]
    async fn from_lines_yields_then_exhausts() {
        let follower = MemoryFollower::from_lines(["a", "b", "c"]);
        assert_eq!(drain(follower).await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn chunks_are_split_on_newlines() {
        let (writer, follower) = memory_feed();
        writer.write("one\ntw");
        writer.write("o\nthree\n");
        drop(writer);
        assert_eq!(drain(follower).await, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn unterminated_tail_is_never_yielded() {
        let (writer, follower) = memory_feed();
        writer.write("done\npartial");
        drop(writer);
        assert_eq!(drain(follower).await, vec!["done"]);
    }

    #[tokio::test]
    async fn write_after_follower_dropped_reports_false() {
        let (writer, follower) = memory_feed();
        drop(follower);
        assert!(!writer.write_line("lost"));
    }
}
