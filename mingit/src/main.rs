mod output;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use mingit_core::{CommitOutcome, GlobIgnore, Hash, IGNORE_FILE, Repository};
use output::{
    AddOutput, CatFileOutput, CommitOutput, DiffOutput, FileDiffInfo, InitOutput, LogEntryInfo,
    LogOutput, LsTreeOutput, OutputWriter, StatusOutput, TreeEntryInfo, WriteTreeOutput,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Mingit - a minimal content-addressed version control engine
#[derive(Parser)]
#[command(name = "mingit")]
#[command(about = "Minimal content-addressed version control using BLAKE3", long_about = None)]
#[command(version)]
struct Cli {
    /// Working tree root (defaults to MINGIT_ROOT, else the nearest directory holding .mingit)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty repository
    Init,

    /// Stage files or directories
    Add {
        /// Paths to stage
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Record the staged tree as a new commit
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,
    },

    /// Show working tree, index and HEAD differences
    Status,

    /// Show history from HEAD
    Log,

    /// Show unstaged changes as unified diffs
    Diff,

    /// Store the index as a tree and print its hash
    WriteTree,

    /// Print the payload of a stored object
    CatFile {
        /// Hash of the object
        hash: String,
    },

    /// List the entries of a tree object
    LsTree {
        /// Hash of the tree
        hash: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let out = OutputWriter::new(cli.json);
    match run(cli, &out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            out.write_error(&e, 1);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, out: &OutputWriter) -> Result<()> {
    // Working tree root: CLI arg > MINGIT_ROOT env var > discovery from cwd
    let root = cli
        .root
        .or_else(|| std::env::var("MINGIT_ROOT").ok().map(PathBuf::from));

    if let Commands::Init = cli.command {
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        return cmd_init(&root, out);
    }

    let repo = open_repo(root.as_deref())?;
    match cli.command {
        Commands::Init => Ok(()),
        Commands::Add { paths } => cmd_add(&repo, paths, out),
        Commands::Commit { message } => cmd_commit(&repo, &message, out),
        Commands::Status => cmd_status(&repo, out),
        Commands::Log => cmd_log(&repo, out),
        Commands::Diff => cmd_diff(&repo, out),
        Commands::WriteTree => cmd_write_tree(&repo, out),
        Commands::CatFile { hash } => cmd_cat_file(&repo, &hash, out),
        Commands::LsTree { hash } => cmd_ls_tree(&repo, &hash, out),
    }
}

fn open_repo(root: Option<&Path>) -> Result<Repository> {
    let repo = match root {
        Some(root) => Repository::open(root)
            .with_context(|| format!("Failed to open repository at {}", root.display()))?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Repository::discover(&cwd)
                .with_context(|| format!("Not inside a repository: {}", cwd.display()))?
        }
    };

    debug!(root = %repo.work_dir().display(), "opened repository");

    let ignore_path = repo.work_dir().join(IGNORE_FILE);
    if !ignore_path.is_file() {
        return Ok(repo);
    }

    let content = fs::read_to_string(&ignore_path)
        .with_context(|| format!("Failed to read {}", ignore_path.display()))?;
    let patterns = parse_ignore_patterns(&content);
    debug!(path = %ignore_path.display(), patterns = patterns.len(), "loaded ignore file");
    let ignore = GlobIgnore::new(repo.work_dir(), &patterns)
        .with_context(|| format!("Invalid pattern in {}", ignore_path.display()))?;

    Ok(repo.with_ignore(ignore))
}

/// One pattern per line; blank lines and `#` comments are skipped.
fn parse_ignore_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn parse_hash(hash_str: &str) -> Result<Hash> {
    Hash::from_hex(hash_str).with_context(|| format!("Invalid hash: {}", hash_str))
}

fn cmd_init(root: &Path, out: &OutputWriter) -> Result<()> {
    let repo = Repository::init(root)
        .with_context(|| format!("Failed to initialize repository at {}", root.display()))?;

    let data = InitOutput {
        success: true,
        result_code: 0,
        root: repo.work_dir().display().to_string(),
        algorithm: repo.config().algorithm.as_str().to_string(),
    };

    out.write(&data, || {
        format!(
            "Initialized empty mingit repository in {}\n",
            repo.work_dir().display()
        )
    })
}

fn cmd_add(repo: &Repository, paths: Vec<PathBuf>, out: &OutputWriter) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut data = AddOutput {
        success: true,
        ..Default::default()
    };

    for path in paths {
        let target = if path.is_absolute() {
            path.clone()
        } else {
            cwd.join(&path)
        };
        let report = repo
            .add(&target)
            .with_context(|| format!("Failed to add path: {}", path.display()))?;

        data.staged.extend(report.staged);
        data.unchanged.extend(report.unchanged);
    }

    out.write(&data, || {
        data.staged
            .iter()
            .map(|path| format!("staged {}\n", path))
            .collect()
    })
}

fn cmd_commit(repo: &Repository, message: &str, out: &OutputWriter) -> Result<()> {
    let outcome = repo.commit(message).context("Failed to commit")?;

    let hash = match outcome {
        CommitOutcome::Created(hash) => Some(hash),
        CommitOutcome::NothingToCommit => None,
    };
    let data = CommitOutput {
        success: true,
        result_code: 0,
        created: hash.is_some(),
        hash,
    };

    out.write(&data, || match hash {
        Some(hash) => format!("[mingit commit] {}\n", hash),
        None => "Nothing to commit, working tree clean.\n".to_string(),
    })
}

fn cmd_status(repo: &Repository, out: &OutputWriter) -> Result<()> {
    let status = repo.status().context("Failed to compute status")?;
    out.write(&StatusOutput::from(&status), || status.to_string())
}

fn cmd_log(repo: &Repository, out: &OutputWriter) -> Result<()> {
    let entries = repo.log().context("Failed to read history")?;

    let commits: Vec<LogEntryInfo> = entries
        .iter()
        .map(|entry| LogEntryInfo::new(entry, format_date(entry.commit.timestamp)))
        .collect();

    let data = LogOutput {
        success: true,
        result_code: 0,
        commits,
    };

    out.write(&data, || {
        data.commits
            .iter()
            .map(|c| {
                format!(
                    "commit {}\nAuthor: {}\nDate: {}\n\n    {}\n\n",
                    c.hash, c.author, c.date, c.message
                )
            })
            .collect()
    })
}

/// Local time in `ctime` layout, e.g. `Tue Mar  4 10:15:00 2025`.
fn format_date(timestamp: f64) -> String {
    let secs = timestamp.floor() as i64;
    let nanos = (timestamp.fract() * 1e9) as u32;

    match DateTime::from_timestamp(secs, nanos) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%a %b %e %H:%M:%S %Y")
            .to_string(),
        None => format!("{}", timestamp),
    }
}

fn cmd_diff(repo: &Repository, out: &OutputWriter) -> Result<()> {
    let diffs = repo.diff().context("Failed to compute diff")?;

    let data = DiffOutput {
        success: true,
        result_code: 0,
        files: diffs.iter().map(FileDiffInfo::from).collect(),
    };

    out.write(&data, || diffs.iter().map(|d| d.to_string()).collect())
}

fn cmd_write_tree(repo: &Repository, out: &OutputWriter) -> Result<()> {
    let hash = repo.write_tree().context("Failed to write tree")?;

    let data = WriteTreeOutput {
        success: true,
        result_code: 0,
        hash,
    };

    out.write(&data, || format!("{}\n", hash))
}

fn cmd_cat_file(repo: &Repository, hash_str: &str, out: &OutputWriter) -> Result<()> {
    let hash = parse_hash(hash_str)?;
    let (kind, payload) = repo
        .store()
        .get(&hash)
        .with_context(|| format!("Failed to read object {}", hash))?;

    if !out.is_json() {
        // Raw bytes, untouched by text formatting
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(&payload)?;
        handle.flush()?;
        return Ok(());
    }

    let data = CatFileOutput {
        success: true,
        result_code: 0,
        hash,
        kind: kind.as_str().to_string(),
        size: payload.len(),
        content: String::from_utf8(payload).ok(),
    };

    out.write(&data, String::new)
}

fn cmd_ls_tree(repo: &Repository, hash_str: &str, out: &OutputWriter) -> Result<()> {
    let hash = parse_hash(hash_str)?;
    let entries = repo
        .store()
        .get_tree(&hash)
        .with_context(|| format!("Failed to read tree {}", hash))?;

    let entries = entries
        .iter()
        .map(|entry| Ok(TreeEntryInfo::new(entry, entry_kind(repo, &entry.sha)?)))
        .collect::<Result<Vec<_>>>()?;

    let data = LsTreeOutput {
        success: true,
        result_code: 0,
        hash,
        entries,
    };

    out.write(&data, || {
        data.entries
            .iter()
            .map(|e| format!("{} {} {}\t{}\n", e.mode, e.kind, e.hash, e.path))
            .collect()
    })
}

/// Kind of the object an entry points at, or `"missing"` if it is not stored.
fn entry_kind(repo: &Repository, hash: &Hash) -> Result<&'static str> {
    match repo.store().kind_of(hash) {
        Ok(kind) => Ok(kind.as_str()),
        Err(e) if e.is_not_found() => Ok("missing"),
        Err(e) => Err(e).with_context(|| format!("Failed to read object {}", hash)),
    }
}
