//! loglift-feeds — line followers for loglift.
//!
//! A [`Follower`] produces the newline-delimited records of a growing source,
//! one [`RawLine`] at a time, in source order. Two implementations ship here:
//!
//! - [`FileFollower`] tails a file from its current end, polling at EOF.
//! - [`MemoryFollower`] is fed from an in-process channel; used by tests and
//!   anything that already has the bytes in memory.
//!
//! Neither follower ever yields a line before its terminating newline has
//! arrived.

pub mod file;
pub mod memory;

use std::future::Future;
use std::path::PathBuf;

pub use file::{FileFollower, DEFAULT_POLL_INTERVAL};
pub use loglift_core::RawLine;
pub use memory::{memory_feed, MemoryFollower, MemoryWriter};

/// A lazy, unbounded sequence of complete lines.
pub trait Follower: Send {
    /// Wait for the next complete line.
    ///
    /// `Ok(None)` means the source is exhausted and will never produce another
    /// line. Any `Err` is fatal to whoever is driving the follower.
    fn next_line(&mut self) -> impl Future<Output = Result<Option<RawLine>, FeedError>> + Send;
}

/// Fatal follower failures.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("read from {} failed: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}
