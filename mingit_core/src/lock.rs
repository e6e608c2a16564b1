//! Exclusive repository lock for index and HEAD updates.

use crate::error::Result;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::{debug, warn};

/// Guard holding an exclusive advisory lock on `<meta>/lock`.
///
/// Blocks until the lock is available. Released on drop.
#[derive(Debug)]
pub struct RepoLock {
    file: File,
}

impl RepoLock {
    /// Acquire the lock file at `path`, creating it if needed.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)?;

        file.lock_exclusive()?;
        debug!(path = %path.display(), "acquired repository lock");

        Ok(Self { file })
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(error = %e, "failed to release repository lock");
        }
    }
}
