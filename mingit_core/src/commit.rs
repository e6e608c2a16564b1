//! Commit objects.

use crate::error::{Error, Result};
use crate::hash::{Hash, hex_or_empty};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A commit: one tree, at most one parent, and who/when/why metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Root tree of the snapshot.
    pub tree: Hash,
    /// Previous commit; `None` for the root commit.
    #[serde(with = "hex_or_empty")]
    pub parent: Option<Hash>,
    /// Author identity, `Name <email>`.
    pub author: String,
    /// Committer identity, `Name <email>`.
    pub committer: String,
    /// Commit message.
    pub message: String,
    /// Seconds since the Unix epoch, with sub-second precision.
    pub timestamp: f64,
}

impl Commit {
    /// Build a commit stamped with the current time.
    pub fn new(
        tree: Hash,
        parent: Option<Hash>,
        author: impl Into<String>,
        committer: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            parent,
            author: author.into(),
            committer: committer.into(),
            message: message.into(),
            timestamp: now_timestamp(),
        }
    }

    /// Serialize the commit fields (the payload after the header).
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = serde_json::to_vec_pretty(self).map_err(std::io::Error::from)?;
        Ok(payload)
    }

    /// Decode commit fields. Failure means the history is unreadable.
    pub fn decode(hash: &Hash, payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(|e| {
            Error::corrupt_history(format!("Commit {} does not decode: {}", hash, e))
        })
    }
}

fn now_timestamp() -> f64 {
    // A clock before 1970 is treated as the epoch itself
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_encode_decode() {
        let tree = Hash::hash_bytes(b"tree");
        let parent = Hash::hash_bytes(b"parent");
        let commit = Commit::new(tree, Some(parent), "A <a@x>", "C <c@x>", "msg");

        let payload = commit.encode().unwrap();
        let decoded = Commit::decode(&Hash::hash_bytes(&payload), &payload).unwrap();
        assert_eq!(decoded.tree, tree);
        assert_eq!(decoded.parent, Some(parent));
        assert_eq!(decoded.author, "A <a@x>");
        assert_eq!(decoded.committer, "C <c@x>");
        assert_eq!(decoded.message, "msg");
        assert!((decoded.timestamp - commit.timestamp).abs() < 1e-3);
    }

    #[test]
    fn test_root_commit_has_empty_parent() {
        let commit = Commit::new(Hash::hash_bytes(b"tree"), None, "A", "A", "first");
        let text = String::from_utf8(commit.encode().unwrap()).unwrap();

        assert!(text.contains("\"parent\": \"\""));
        let decoded = Commit::decode(&Hash::hash_bytes(b"c"), text.as_bytes()).unwrap();
        assert_eq!(decoded.parent, None);
    }

    #[test]
    fn test_commit_timestamp_is_recent() {
        let commit = Commit::new(Hash::hash_bytes(b"tree"), None, "A", "A", "m");
        // 2020-01-01
        assert!(commit.timestamp > 1_577_836_800.0);
    }

    #[test]
    fn test_decode_failure_is_corrupt_history() {
        let err = Commit::decode(&Hash::hash_bytes(b"c"), b"not json").unwrap_err();
        assert!(matches!(err, Error::CorruptHistory { .. }));

        let missing_tree = br#"{"parent": "", "author": "a", "committer": "a", "message": "m", "timestamp": 1.0}"#;
        assert!(Commit::decode(&Hash::hash_bytes(b"c"), missing_tree).is_err());
    }
}
