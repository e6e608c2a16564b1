//! Ignore predicates consulted while walking the working tree.

use crate::error::Result;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Decides whether a repository-relative path is left out of add and status.
///
/// Directories are asked before they are descended into, so an ignored
/// directory prunes everything below it.
pub trait IgnorePredicate: Send + Sync {
    /// `path` is relative to the working tree root.
    fn is_ignored(&self, path: &Path, is_dir: bool) -> bool;
}

impl<F> IgnorePredicate for F
where
    F: Fn(&Path, bool) -> bool + Send + Sync,
{
    fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self(path, is_dir)
    }
}

/// Ignores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIgnore;

impl IgnorePredicate for NoIgnore {
    fn is_ignored(&self, _path: &Path, _is_dir: bool) -> bool {
        false
    }
}

/// Glob patterns with gitignore semantics.
///
/// A pattern without `/` matches a file or directory name at any depth;
/// a pattern with `/` is anchored at the working tree root; `!` re-includes.
#[derive(Debug, Clone)]
pub struct GlobIgnore {
    matcher: Gitignore,
}

impl GlobIgnore {
    /// Compile patterns relative to `root`.
    pub fn new<I, S>(root: &Path, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            builder.add_line(None, pattern.as_ref())?;
        }

        Ok(Self {
            matcher: builder.build()?,
        })
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.matcher.len()
    }

    /// Whether no patterns were given.
    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }
}

impl IgnorePredicate for GlobIgnore {
    fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.matcher.matched(path, is_dir).is_ignore()
    }
}
