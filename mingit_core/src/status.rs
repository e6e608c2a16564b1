//! Three-way status between the working tree, the index and HEAD.

use crate::error::Result;
use crate::object::ObjectKind;
use crate::repo::Repository;
use crate::store::ObjectStore;
use crate::walk::walk_index_paths;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// How a staged path differs from the HEAD commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Not in the HEAD tree.
    NewFile,
    /// In the HEAD tree with different content.
    Modified,
}

/// A path whose staged content differs from HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedChange {
    pub path: String,
    pub kind: ChangeKind,
}

/// Final state of a single path, one per path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathState {
    /// Working tree, index and HEAD agree.
    Unmodified,
    /// The working file differs from the index.
    Modified,
    /// Staged, absent from HEAD.
    StagedNew,
    /// Staged with content that differs from HEAD.
    StagedModified,
    /// Present in the working tree, absent from the index.
    Untracked,
}

/// Result of [`Repository::status`]. Lists follow index order; untracked
/// paths follow walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    /// Every index path.
    pub tracked: Vec<String>,
    /// Index paths whose working file re-hashes differently.
    pub unstaged: Vec<String>,
    /// Index paths that differ from the HEAD tree.
    pub staged: Vec<StagedChange>,
    /// Working files not in the index.
    pub untracked: Vec<String>,
}

impl Status {
    /// Nothing unstaged, staged or untracked.
    pub fn is_clean(&self) -> bool {
        self.unstaged.is_empty() && self.staged.is_empty() && self.untracked.is_empty()
    }

    /// Assign every tracked and untracked path exactly one state.
    ///
    /// An unstaged modification wins over a staged one.
    pub fn classify(&self) -> Vec<(String, PathState)> {
        let unstaged: HashSet<&str> = self.unstaged.iter().map(String::as_str).collect();
        let staged: HashMap<&str, ChangeKind> = self
            .staged
            .iter()
            .map(|change| (change.path.as_str(), change.kind))
            .collect();

        let mut states = Vec::with_capacity(self.tracked.len() + self.untracked.len());

        for path in &self.tracked {
            let state = if unstaged.contains(path.as_str()) {
                PathState::Modified
            } else {
                match staged.get(path.as_str()) {
                    Some(ChangeKind::NewFile) => PathState::StagedNew,
                    Some(ChangeKind::Modified) => PathState::StagedModified,
                    None => PathState::Unmodified,
                }
            };
            states.push((path.clone(), state));
        }

        for path in &self.untracked {
            states.push((path.clone(), PathState::Untracked));
        }

        states
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "nothing to commit, working tree clean");
        }

        if !self.unstaged.is_empty() {
            writeln!(f, "Changes not staged for commit:")?;
            for path in &self.unstaged {
                writeln!(f, "\tmodified: {}", path)?;
            }
        }

        if !self.staged.is_empty() {
            writeln!(f, "Changes to be committed:")?;
            for change in &self.staged {
                let label = match change.kind {
                    ChangeKind::NewFile => "new file",
                    ChangeKind::Modified => "modified",
                };
                writeln!(f, "\t{}: {}", label, change.path)?;
            }
        }

        if !self.untracked.is_empty() {
            writeln!(f, "Untracked files:")?;
            for path in &self.untracked {
                writeln!(f, "\t{}", path)?;
            }
        }

        Ok(())
    }
}

impl Repository {
    /// Compare the working tree against the index, and the index against HEAD.
    ///
    /// A tracked path whose working file is gone is not reported as unstaged.
    pub fn status(&self) -> Result<Status> {
        let index = self.index()?;
        let committed = self.head_snapshot()?;
        let mut status = Status::default();

        for (path, staged) in index.iter() {
            status.tracked.push(path.to_string());

            if let Some(data) = self.read_working(path)? {
                if ObjectStore::hash_object(ObjectKind::Blob, &data) != *staged {
                    status.unstaged.push(path.to_string());
                }
            }

            let kind = match committed.get(path) {
                None => Some(ChangeKind::NewFile),
                Some(head) if head != staged => Some(ChangeKind::Modified),
                Some(_) => None,
            };
            if let Some(kind) = kind {
                status.staged.push(StagedChange {
                    path: path.to_string(),
                    kind,
                });
            }
        }

        for (_, path) in walk_index_paths(&self.work_dir, &self.work_dir, &self.ignore)? {
            if !index.contains(&path) {
                status.untracked.push(path);
            }
        }

        Ok(status)
    }
}
