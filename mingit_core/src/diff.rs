//! Unified diffs between staged blobs and working-tree files.

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::ObjectKind;
use crate::repo::Repository;
use crate::store::ObjectStore;
use crate::tree::file_modes;
use similar::{ChangeTag, TextDiff};
use std::fmt;
use std::ops::Range;

/// Lines of unchanged context around each hunk.
pub const CONTEXT_LINES: usize = 3;

/// Body of a file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Unified hunks, one `@@` header each.
    Text(String),
    /// Either side is not line-based text.
    Binary,
}

/// Difference between the staged and working copy of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Repository-relative path.
    pub path: String,
    /// Staged blob digest.
    pub old: Hash,
    /// Digest of the working-tree content.
    pub new: Hash,
    /// File mode string.
    pub mode: String,
    /// Line changes.
    pub patch: Patch,
}

impl fmt::Display for FileDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "diff --git a/{} b/{}", self.path, self.path)?;
        writeln!(f, "index {}..{} {}", self.old.short(), self.new.short(), self.mode)?;
        match &self.patch {
            Patch::Text(hunks) => {
                writeln!(f, "--- a/{}", self.path)?;
                writeln!(f, "+++ b/{}", self.path)?;
                write!(f, "{}", hunks)
            }
            Patch::Binary => {
                writeln!(f, "Binary files a/{} and b/{} differ", self.path, self.path)
            }
        }
    }
}

/// Render unified hunks between two texts.
///
/// Fails with `NotDiffable` when either side is not valid UTF-8 or holds a NUL byte.
pub fn unified_diff(old: &[u8], new: &[u8], context: usize) -> Result<String> {
    let old = as_text(old, "old")?;
    let new = as_text(new, "new")?;

    // Lines compare without their terminators
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let diff = TextDiff::from_slices(&old_lines, &new_lines);
    let mut out = String::new();

    for group in diff.grouped_ops(context) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_range = first.old_range().start..last.old_range().end;
        let new_range = first.new_range().start..last.new_range().end;
        out.push_str(&format!(
            "@@ -{} +{} @@\n",
            format_range(old_range),
            format_range(new_range)
        ));

        for op in &group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                    ChangeTag::Equal => ' ',
                };
                out.push(sign);
                out.push_str(change.value());
                out.push('\n');
            }
        }
    }

    Ok(out)
}

fn as_text<'a>(data: &'a [u8], side: &str) -> Result<&'a str> {
    if data.contains(&0) {
        return Err(Error::not_diffable(format!("{} content is binary", side)));
    }
    std::str::from_utf8(data)
        .map_err(|e| Error::not_diffable(format!("{} content is not UTF-8: {}", side, e)))
}

/// `start,len` in 1-based lines; a single line drops the length, an empty
/// range names the line before it.
fn format_range(range: Range<usize>) -> String {
    let len = range.end - range.start;
    match len {
        0 => format!("{},0", range.start),
        1 => format!("{}", range.start + 1),
        _ => format!("{},{}", range.start + 1, len),
    }
}

impl Repository {
    /// Diff every tracked file whose working content differs from the index.
    ///
    /// Files that are gone from the working tree are skipped. Content that
    /// is not line-based text yields a [`Patch::Binary`] marker.
    pub fn diff(&self) -> Result<Vec<FileDiff>> {
        let index = self.index()?;
        let mut diffs = Vec::new();

        for (path, old) in index.iter() {
            let Some(data) = self.read_working(path)? else {
                continue;
            };
            let new = ObjectStore::hash_object(ObjectKind::Blob, &data);
            if new == *old {
                continue;
            }

            let staged = self.store.get_blob(old)?;
            let patch = match unified_diff(&staged, &data, CONTEXT_LINES) {
                Ok(hunks) => Patch::Text(hunks),
                Err(Error::NotDiffable { .. }) => Patch::Binary,
                Err(e) => return Err(e),
            };

            diffs.push(FileDiff {
                path: path.to_string(),
                old: *old,
                new,
                mode: file_modes::REGULAR.to_string(),
                patch,
            });
        }

        Ok(diffs)
    }
}
