//! File follower — `tail -f` for a single path.
//!
//! The follower opens the file once, seeks to its end, and from then on only
//! sees bytes appended after that point. At EOF it sleeps for the poll
//! interval and tries again.
//!
//! Rotation and truncation are not supported: the follower keeps reading the
//! handle it opened. If the file is renamed away and recreated, the follower
//! stalls on the old inode; if it is truncated, reads stay at EOF until the
//! file grows past the old offset again. Restart the pipeline after rotating.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tracing::{debug, trace};

use crate::{FeedError, Follower, RawLine};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Follows appends to one file. The handle is owned here and closed when the
/// follower is dropped.
pub struct FileFollower {
    path: PathBuf,
    reader: BufReader<File>,
    /// Bytes of a line whose newline has not been written yet.
    pending: Vec<u8>,
    poll_interval: Duration,
}

impl FileFollower {
    /// Open `path` and position the cursor at its current end.
    pub async fn open(path: impl AsRef<Path>, poll_interval: Duration) -> Result<Self, FeedError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| FeedError::Open {
            path: path.clone(),
            source,
        };

        let mut file = File::open(&path).await.map_err(open_err)?;
        let offset = file.seek(SeekFrom::End(0)).await.map_err(open_err)?;
        debug!(path = %path.display(), offset, "following file from its end");

        Ok(Self {
            path,
            reader: BufReader::new(file),
            pending: Vec::new(),
            poll_interval,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Follower for FileFollower {
    async fn next_line(&mut self) -> Result<Option<RawLine>, FeedError> {
        loop {
            let n = self
                .reader
                .read_until(b'\n', &mut self.pending)
                .await
                .map_err(|source| FeedError::Read {
                    path: self.path.clone(),
                    source,
                })?;

            if self.pending.last() == Some(&b'\n') {
                let line = std::mem::take(&mut self.pending);
                return Ok(Some(RawLine::new(line)));
            }

            if n == 0 {
                trace!(path = %self.path.display(), partial = self.pending.len(), "at eof, waiting");
                tokio::time::sleep(self.poll_interval).await;
            }
        }
    }
}
