//! The HEAD reference.

use crate::error::{Error, Result};
use crate::hash::Hash;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// The mutable pointer to the tip of history.
///
/// The file holds either nothing (no commit yet) or the hex digest of the tip
/// commit.
#[derive(Debug, Clone)]
pub struct Head {
    path: PathBuf,
}

impl Head {
    /// Create a handle for the HEAD file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the HEAD file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an empty HEAD.
    pub fn init(&self) -> Result<()> {
        fs::write(&self.path, "")?;
        Ok(())
    }

    /// Get the current tip commit, if any.
    pub fn get(&self) -> Result<Option<Hash>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        Hash::from_hex(content)
            .map(Some)
            .map_err(|e| Error::corrupt_history(format!("HEAD is unreadable: {}", e)))
    }

    /// Move HEAD to `new`, provided it still points at `expected`.
    pub fn compare_and_swap(&self, expected: Option<Hash>, new: &Hash) -> Result<()> {
        let current = self.get()?;
        if current != expected {
            return Err(Error::concurrent_update(
                describe(expected),
                describe(current),
            ));
        }

        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::invalid_path(&self.path, "HEAD has no parent directory"))?;

        let mut temp_file = tempfile::NamedTempFile::new_in(dir)?;
        temp_file.write_all(new.to_hex().as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(&self.path)?;

        Ok(())
    }
}

fn describe(hash: Option<Hash>) -> String {
    match hash {
        Some(hash) => hash.to_hex(),
        None => "<empty>".to_string(),
    }
}
