//! Output formatting for CLI commands.
//!
//! Results are printed either as human text or as one JSON document.

use anyhow::Result;
use mingit_core::{ChangeKind, FileDiff, Hash, LogEntry, Patch, StagedChange, Status, TreeEntry};
use serde::Serialize;
use std::io::{self, Write};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writer for command output with format abstraction.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            stdout: io::stdout(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Write `data` as JSON, or the text built by `text_fn`.
    ///
    /// `text_fn` only runs in text mode.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                writeln!(&self.stdout, "{}", json)?;
            }
            OutputFormat::Text => {
                let text = text_fn();
                if !text.is_empty() {
                    write!(&self.stdout, "{}", text)?;
                }
            }
        }
        Ok(())
    }

    /// Report a failed command on stderr.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code,
                    error: format!("{:#}", error),
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(io::stderr(), "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = writeln!(io::stderr(), "Error: {:#}", error);
            }
        }
    }
}

// ============================================================================
// Data Transfer Objects (DTOs) for JSON output
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

/// Output for `init` command.
#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub result_code: u8,
    pub root: String,
    pub algorithm: String,
}

/// Output for `add` command.
#[derive(Debug, Default, Serialize)]
pub struct AddOutput {
    pub success: bool,
    pub result_code: u8,
    pub staged: Vec<String>,
    pub unchanged: Vec<String>,
}

/// Output for `commit` command.
#[derive(Debug, Serialize)]
pub struct CommitOutput {
    pub success: bool,
    pub result_code: u8,
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash>,
}

/// Staged path for `status` command.
#[derive(Debug, Serialize)]
pub struct StagedInfo {
    pub path: String,
    pub kind: &'static str,
}

impl From<&StagedChange> for StagedInfo {
    fn from(change: &StagedChange) -> Self {
        Self {
            path: change.path.clone(),
            kind: match change.kind {
                ChangeKind::NewFile => "new file",
                ChangeKind::Modified => "modified",
            },
        }
    }
}

/// Output for `status` command.
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub success: bool,
    pub result_code: u8,
    pub clean: bool,
    pub unstaged: Vec<String>,
    pub staged: Vec<StagedInfo>,
    pub untracked: Vec<String>,
}

impl From<&Status> for StatusOutput {
    fn from(status: &Status) -> Self {
        Self {
            success: true,
            result_code: 0,
            clean: status.is_clean(),
            unstaged: status.unstaged.clone(),
            staged: status.staged.iter().map(StagedInfo::from).collect(),
            untracked: status.untracked.clone(),
        }
    }
}

/// Commit information for `log` command.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntryInfo {
    pub hash: Hash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Hash>,
    pub tree: Hash,
    pub author: String,
    pub committer: String,
    pub message: String,
    pub timestamp: f64,
    pub date: String,
}

impl LogEntryInfo {
    pub fn new(entry: &LogEntry, date: String) -> Self {
        Self {
            hash: entry.hash,
            parent: entry.commit.parent,
            tree: entry.commit.tree,
            author: entry.commit.author.clone(),
            committer: entry.commit.committer.clone(),
            message: entry.commit.message.clone(),
            timestamp: entry.commit.timestamp,
            date,
        }
    }
}

/// Output for `log` command.
#[derive(Debug, Serialize)]
pub struct LogOutput {
    pub success: bool,
    pub result_code: u8,
    pub commits: Vec<LogEntryInfo>,
}

/// One changed file for `diff` command.
#[derive(Debug, Serialize)]
pub struct FileDiffInfo {
    pub path: String,
    pub old: Hash,
    pub new: Hash,
    pub mode: String,
    pub binary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hunks: Option<String>,
}

impl From<&FileDiff> for FileDiffInfo {
    fn from(diff: &FileDiff) -> Self {
        let (binary, hunks) = match &diff.patch {
            Patch::Text(hunks) => (false, Some(hunks.clone())),
            Patch::Binary => (true, None),
        };
        Self {
            path: diff.path.clone(),
            old: diff.old,
            new: diff.new,
            mode: diff.mode.clone(),
            binary,
            hunks,
        }
    }
}

/// Output for `diff` command.
#[derive(Debug, Serialize)]
pub struct DiffOutput {
    pub success: bool,
    pub result_code: u8,
    pub files: Vec<FileDiffInfo>,
}

/// Output for `write-tree` command.
#[derive(Debug, Serialize)]
pub struct WriteTreeOutput {
    pub success: bool,
    pub result_code: u8,
    pub hash: Hash,
}

/// Output for `cat-file` command.
#[derive(Debug, Serialize)]
pub struct CatFileOutput {
    pub success: bool,
    pub result_code: u8,
    pub hash: Hash,
    pub kind: String,
    pub size: usize,
    /// Payload as text; absent when it is not UTF-8.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Tree entry information for `ls-tree` command.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntryInfo {
    pub path: String,
    pub mode: String,
    pub kind: String,
    pub hash: Hash,
}

impl TreeEntryInfo {
    pub fn new(entry: &TreeEntry, kind: &str) -> Self {
        Self {
            path: entry.path.clone(),
            mode: entry.mode.clone(),
            kind: kind.to_string(),
            hash: entry.sha,
        }
    }
}

/// Output for `ls-tree` command.
#[derive(Debug, Serialize)]
pub struct LsTreeOutput {
    pub success: bool,
    pub result_code: u8,
    pub hash: Hash,
    pub entries: Vec<TreeEntryInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_output_from_status() {
        let status = Status {
            tracked: vec!["a.txt".into(), "b.txt".into()],
            unstaged: vec!["a.txt".into()],
            staged: vec![StagedChange {
                path: "b.txt".into(),
                kind: ChangeKind::NewFile,
            }],
            untracked: vec![],
        };

        let output = StatusOutput::from(&status);
        assert!(!output.clean);
        assert_eq!(output.staged[0].kind, "new file");

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["unstaged"][0], "a.txt");
        assert_eq!(json["staged"][0]["path"], "b.txt");
    }

    #[test]
    fn test_binary_diff_has_no_hunks() {
        let diff = FileDiff {
            path: "img.png".into(),
            old: Hash::hash_bytes(b"1"),
            new: Hash::hash_bytes(b"2"),
            mode: "100644".into(),
            patch: Patch::Binary,
        };

        let json = serde_json::to_value(FileDiffInfo::from(&diff)).unwrap();
        assert_eq!(json["binary"], true);
        assert!(json.get("hunks").is_none());
        assert_eq!(json["old"], diff.old.to_hex());
    }
}
