//! Higher-level operations this engine does not provide.
//!
//! Each method fails with [`Error::Unsupported`] so callers get a typed answer
//! instead of a missing method.

use crate::error::{Error, Result};
use std::path::Path;

/// Porcelain surface outside the object model and reconciliation engine.
pub trait Porcelain {
    /// Merge another line of history into HEAD.
    fn merge(&self, _branch: &str) -> Result<()> {
        Err(Error::unsupported("merge"))
    }

    /// Replay HEAD onto another commit.
    fn rebase(&self, _onto: &str) -> Result<()> {
        Err(Error::unsupported("rebase"))
    }

    /// Create a named branch.
    fn branch(&self, _name: &str) -> Result<()> {
        Err(Error::unsupported("branch"))
    }

    /// Create a named tag.
    fn tag(&self, _name: &str) -> Result<()> {
        Err(Error::unsupported("tag"))
    }

    /// Register a remote repository.
    fn remote(&self, _name: &str, _url: &str) -> Result<()> {
        Err(Error::unsupported("remote"))
    }

    /// Send commits to a remote.
    fn push(&self, _remote: &str) -> Result<()> {
        Err(Error::unsupported("push"))
    }

    /// Fetch and integrate commits from a remote.
    fn pull(&self, _remote: &str) -> Result<()> {
        Err(Error::unsupported("pull"))
    }

    /// Download objects from a remote.
    fn fetch(&self, _remote: &str) -> Result<()> {
        Err(Error::unsupported("fetch"))
    }

    /// Copy a remote repository into `dest`.
    fn clone_repository(&self, _url: &str, _dest: &Path) -> Result<()> {
        Err(Error::unsupported("clone"))
    }

    /// Replace the working tree with another snapshot.
    fn checkout(&self, _target: &str) -> Result<()> {
        Err(Error::unsupported("checkout"))
    }
}
