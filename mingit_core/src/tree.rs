//! Tree encoding.

use crate::error::{Error, Result};
use crate::hash::Hash;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Common file modes, as written into tree entries.
pub mod file_modes {
    /// Regular file (non-executable).
    pub const REGULAR: &str = "100644";

    /// Directory.
    pub const DIRECTORY: &str = "040000";
}

/// An entry in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Path relative to the tree, `/`-separated.
    pub path: String,
    /// File mode string.
    pub mode: String,
    /// Hash of the referenced blob or subtree.
    pub sha: Hash,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(path: impl Into<String>, mode: impl Into<String>, sha: Hash) -> Result<Self> {
        let path = path.into();
        validate_path(&path)?;

        Ok(Self {
            path,
            mode: mode.into(),
            sha,
        })
    }

    /// A regular-file entry.
    pub fn file(path: impl Into<String>, sha: Hash) -> Result<Self> {
        Self::new(path, file_modes::REGULAR, sha)
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    /// Compare by path (bytewise UTF-8) for canonical ordering.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.path.as_bytes().cmp(other.path.as_bytes())
    }
}

fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::invalid_path(path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(Error::invalid_path(path, "Path cannot contain null bytes"));
    }
    if path.starts_with('/') || path.split('/').any(|c| c.is_empty() || c == "." || c == "..") {
        return Err(Error::invalid_path(
            path,
            "Path must be relative without empty, . or .. components",
        ));
    }
    Ok(())
}

/// Encode a list of tree entries (sorted by path).
pub fn encode_tree(mut entries: Vec<TreeEntry>) -> Result<Vec<u8>> {
    // Sort entries by path for canonical ordering
    entries.sort();

    let payload = serde_json::to_vec_pretty(&entries).map_err(std::io::Error::from)?;
    Ok(payload)
}

/// Decode a list of tree entries from bytes.
///
/// `path` is only used for error reporting.
pub fn decode_tree(path: &Path, data: &[u8]) -> Result<Vec<TreeEntry>> {
    let entries: Vec<TreeEntry> = serde_json::from_slice(data)
        .map_err(|e| Error::corrupted_object(path, format!("Invalid tree payload: {}", e)))?;

    for entry in &entries {
        validate_path(&entry.path)
            .map_err(|e| Error::corrupted_object(path, format!("Invalid tree entry: {}", e)))?;
    }

    Ok(entries)
}
