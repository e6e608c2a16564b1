//! # Mingit Core
//!
//! A minimal content-addressed version-control engine using BLAKE3 hashing.
//!
//! Snapshots of a file tree are recorded as immutable blob, tree and commit
//! objects. A staging index sits between the working tree and history, and
//! the reconciliation engine reports how the three differ.
//!
//! ## Features
//!
//! - Content-addressed object store with deduplication
//! - Insertion-ordered staging index
//! - Commits chained by parent from a single HEAD
//! - Status and unified diffs against the working tree
//! - Pluggable ignore predicates
//!
//! ## Example
//!
//! ```no_run
//! use mingit_core::{CommitOutcome, Repository};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a repository in a working directory
//! let repo = Repository::init("./project")?;
//!
//! // Stage everything and record it
//! repo.add(".")?;
//! if let CommitOutcome::Created(hash) = repo.commit("Initial commit")? {
//!     println!("[mingit] {}", hash);
//! }
//!
//! // Inspect the working tree
//! print!("{}", repo.status()?);
//! for file in repo.diff()? {
//!     print!("{}", file);
//! }
//! # Ok(())
//! # }
//! ```

mod commit;
mod config;
mod diff;
mod error;
mod exclude;
mod hash;
mod index;
mod lock;
mod object;
mod porcelain;
mod refs;
mod repo;
mod snapshot;
mod status;
mod store;
mod tree;
mod walk;

pub use commit::Commit;
pub use config::{DEFAULT_IDENTITY, RepoConfig};
pub use diff::{CONTEXT_LINES, FileDiff, Patch, unified_diff};
pub use error::{Error, Result};
pub use exclude::{GlobIgnore, IgnorePredicate, NoIgnore};
pub use hash::{Algorithm, DIGEST_LEN, Hash};
pub use index::Index;
pub use lock::RepoLock;
pub use object::ObjectKind;
pub use porcelain::Porcelain;
pub use refs::Head;
pub use repo::{AddReport, CommitOutcome, IGNORE_FILE, LogEntry, META_DIR, Repository};
pub use snapshot::Snapshot;
pub use status::{ChangeKind, PathState, StagedChange, Status};
pub use store::ObjectStore;
pub use tree::{TreeEntry, decode_tree, encode_tree, file_modes};
