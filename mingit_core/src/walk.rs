//! Working-tree walking with ignore pruning.

use crate::error::{Error, Result};
use crate::exclude::IgnorePredicate;
use crate::repo::META_DIR;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Collect regular files under `start`, in file-name order.
///
/// Every entry below `work_dir` is checked against `predicate` (with its
/// repository-relative path) before it is yielded or descended into. The
/// metadata directory is always pruned. Symlinks are not followed or returned.
pub(crate) fn walk_files(
    work_dir: &Path,
    start: &Path,
    predicate: &Arc<dyn IgnorePredicate>,
) -> Result<Vec<PathBuf>> {
    let root = work_dir.to_path_buf();
    let predicate = Arc::clone(predicate);

    let walker = ignore::WalkBuilder::new(start)
        .standard_filters(false) // The predicate is the only filter
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            match entry.path().strip_prefix(&root) {
                Ok(rel) if rel.as_os_str().is_empty() => true,
                Ok(rel) => !is_meta_dir(rel) && !predicate.is_ignored(rel, is_dir),
                Err(_) => true,
            }
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_some_and(|t| t.is_file()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Like [`walk_files`], paired with each file's index key.
///
/// Files whose names have no index key (not valid UTF-8) are logged and
/// skipped.
pub(crate) fn walk_index_paths(
    work_dir: &Path,
    start: &Path,
    predicate: &Arc<dyn IgnorePredicate>,
) -> Result<Vec<(PathBuf, String)>> {
    let mut keyed = Vec::new();
    for file in walk_files(work_dir, start, predicate)? {
        let Ok(rel) = file.strip_prefix(work_dir) else {
            continue;
        };
        match to_index_path(rel) {
            Ok(key) => keyed.push((file, key)),
            Err(e) => warn!(path = %rel.display(), error = %e, "skipping file"),
        }
    }

    Ok(keyed)
}

fn is_meta_dir(rel: &Path) -> bool {
    rel.components().next() == Some(Component::Normal(META_DIR.as_ref()))
}

/// Index key for a path relative to the working tree: `/`-separated UTF-8.
pub(crate) fn to_index_path(rel: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| Error::invalid_path(rel, "Path is not valid UTF-8"))?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(Error::invalid_path(
                    rel,
                    "Path must be relative to the working tree",
                ));
            }
        }
    }

    if parts.is_empty() {
        return Err(Error::invalid_path(rel, "Path names the working tree root"));
    }

    Ok(parts.join("/"))
}
