//! Repository: a working tree plus its `.mingit` metadata directory.

use crate::commit::Commit;
use crate::config::RepoConfig;
use crate::error::{Error, Result};
use crate::exclude::{IgnorePredicate, NoIgnore};
use crate::hash::Hash;
use crate::index::Index;
use crate::lock::RepoLock;
use crate::object::ObjectKind;
use crate::porcelain::Porcelain;
use crate::refs::Head;
use crate::snapshot::Snapshot;
use crate::store::ObjectStore;
use crate::tree::{TreeEntry, encode_tree};
use crate::walk::{to_index_path, walk_index_paths};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Name of the metadata directory inside the working tree.
pub const META_DIR: &str = ".mingit";

/// Name of the ignore-pattern file the command line reads.
pub const IGNORE_FILE: &str = ".mingitignore";

const OBJECTS_DIR: &str = "objects";
const HEAD_FILE: &str = "HEAD";
const CONFIG_FILE: &str = "config";
const LOCK_FILE: &str = "lock";

/// Paths touched by one [`Repository::add`] call, in visit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Paths whose new content was stored and staged.
    pub staged: Vec<String>,
    /// Paths already staged with identical content.
    pub unchanged: Vec<String>,
}

/// Result of [`Repository::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new commit was written and HEAD now points at it.
    Created(Hash),
    /// The staged tree equals the HEAD tree; nothing was written.
    NothingToCommit,
}

/// One commit in history, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub hash: Hash,
    pub commit: Commit,
}

/// A mingit repository rooted at a working directory.
pub struct Repository {
    pub(crate) work_dir: PathBuf,
    pub(crate) meta_dir: PathBuf,
    pub(crate) store: ObjectStore,
    pub(crate) head: Head,
    pub(crate) config: RepoConfig,
    pub(crate) ignore: Arc<dyn IgnorePredicate>,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("work_dir", &self.work_dir)
            .field("meta_dir", &self.meta_dir)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Create an empty repository in `work_dir`.
    ///
    /// Creates the working directory if needed. Fails with `RepositoryExists`
    /// if a metadata directory is already present.
    pub fn init<P: AsRef<Path>>(work_dir: P) -> Result<Self> {
        let work_dir = work_dir.as_ref();
        fs::create_dir_all(work_dir)?;
        let work_dir = work_dir.canonicalize()?;

        let meta_dir = work_dir.join(META_DIR);
        if meta_dir.exists() {
            return Err(Error::repository_exists(&meta_dir));
        }

        fs::create_dir_all(meta_dir.join(OBJECTS_DIR))?;
        Index::new().save(&Index::default_path(&meta_dir))?;
        Head::new(meta_dir.join(HEAD_FILE)).init()?;

        let config = RepoConfig::default();
        config.save(&meta_dir.join(CONFIG_FILE))?;

        info!(path = %work_dir.display(), "initialized empty repository");
        Ok(Self::assemble(work_dir, meta_dir, config))
    }

    /// Open the repository whose working tree is `work_dir`.
    ///
    /// Validates the metadata layout and reads the configuration.
    pub fn open<P: AsRef<Path>>(work_dir: P) -> Result<Self> {
        let work_dir = work_dir.as_ref();
        let work_dir = work_dir
            .canonicalize()
            .map_err(|_| Error::invalid_repository(work_dir, "directory does not exist"))?;

        let meta_dir = work_dir.join(META_DIR);
        if !meta_dir.is_dir() {
            return Err(Error::invalid_repository(
                &work_dir,
                format!("{} directory not found", META_DIR),
            ));
        }

        let config_path = meta_dir.join(CONFIG_FILE);
        if !config_path.is_file() {
            return Err(Error::invalid_repository(&work_dir, "config file not found"));
        }
        let config = RepoConfig::load(&config_path)?;

        if !meta_dir.join(OBJECTS_DIR).is_dir() {
            return Err(Error::invalid_repository(&work_dir, "objects directory missing"));
        }

        Ok(Self::assemble(work_dir, meta_dir, config))
    }

    /// Find the repository containing `start`, searching parent directories.
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = start.as_ref();
        let start = start
            .canonicalize()
            .map_err(|_| Error::invalid_repository(start, "directory does not exist"))?;

        match start.ancestors().find(|dir| dir.join(META_DIR).is_dir()) {
            Some(work_dir) => Self::open(work_dir),
            None => Err(Error::invalid_repository(
                &start,
                format!("no {} directory here or in any parent", META_DIR),
            )),
        }
    }

    fn assemble(work_dir: PathBuf, meta_dir: PathBuf, config: RepoConfig) -> Self {
        Self {
            store: ObjectStore::new(meta_dir.join(OBJECTS_DIR)),
            head: Head::new(meta_dir.join(HEAD_FILE)),
            work_dir,
            meta_dir,
            config,
            ignore: Arc::new(NoIgnore),
        }
    }

    /// Use `predicate` to leave paths out of directory adds and untracked listings.
    pub fn with_ignore(mut self, predicate: impl IgnorePredicate + 'static) -> Self {
        self.ignore = Arc::new(predicate);
        self
    }

    /// Canonical working tree root.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Metadata directory.
    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    /// The object store.
    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Configuration read at open.
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Location of the index file.
    pub fn index_path(&self) -> PathBuf {
        Index::default_path(&self.meta_dir)
    }

    /// Read the staging index.
    pub fn index(&self) -> Result<Index> {
        Index::load(&self.index_path())
    }

    /// Current tip commit, if any.
    pub fn head(&self) -> Result<Option<Hash>> {
        self.head.get()
    }

    fn lock(&self) -> Result<RepoLock> {
        RepoLock::acquire(&self.meta_dir.join(LOCK_FILE))
    }

    /// Stage a file, or every non-ignored file under a directory.
    ///
    /// Relative paths are taken from the working tree root. Content already
    /// staged under the same path is neither stored nor re-staged. The index
    /// is written once, and only if something changed.
    pub fn add<P: AsRef<Path>>(&self, path: P) -> Result<AddReport> {
        let _lock = self.lock()?;
        let target = self.resolve_in_work_dir(path.as_ref())?;

        let files = if target.is_dir() {
            walk_index_paths(&self.work_dir, &target, &self.ignore)?
        } else {
            let rel = target
                .strip_prefix(&self.work_dir)
                .map_err(|_| Error::path_outside_repository(path.as_ref()))?;
            let key = to_index_path(rel)?;
            vec![(target, key)]
        };

        let index_path = self.index_path();
        let mut index = Index::load(&index_path)?;
        let mut report = AddReport::default();

        for (file, key) in files {
            self.stage_file(&mut index, &file, key, &mut report)?;
        }

        if !report.staged.is_empty() {
            index.save(&index_path)?;
        }

        Ok(report)
    }

    fn stage_file(
        &self,
        index: &mut Index,
        file: &Path,
        key: String,
        report: &mut AddReport,
    ) -> Result<()> {
        let data = fs::read(file)?;
        let hash = ObjectStore::hash_object(ObjectKind::Blob, &data);

        if index.get(&key) == Some(&hash) {
            debug!(path = %key, "content already staged");
            report.unchanged.push(key);
            return Ok(());
        }

        self.store.put_blob(&data)?;
        index.insert(key.clone(), hash);
        debug!(path = %key, %hash, "staged");
        report.staged.push(key);

        Ok(())
    }

    /// Resolve `path` to an absolute location in the working tree, outside
    /// the metadata directory.
    ///
    /// Directories on the way are canonicalized but the last component is
    /// kept as given, so a symlink is never silently replaced by its target.
    /// Symlinks themselves are rejected, as the walk never yields them.
    fn resolve_in_work_dir(&self, path: &Path) -> Result<PathBuf> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        };

        let canonical = match (joined.parent(), joined.file_name()) {
            (Some(parent), Some(name)) => parent.canonicalize().map(|p| p.join(name)),
            _ => joined.canonicalize(),
        };
        let target = match canonical {
            Ok(target) => target,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::path_not_found(path));
            }
            Err(e) => return Err(e.into()),
        };

        let metadata = match fs::symlink_metadata(&target) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::path_not_found(path));
            }
            Err(e) => return Err(e.into()),
        };
        if metadata.file_type().is_symlink() {
            return Err(Error::invalid_path(path, "Symbolic links are not tracked"));
        }

        let rel = target
            .strip_prefix(&self.work_dir)
            .map_err(|_| Error::path_outside_repository(path))?;
        if rel.starts_with(META_DIR) {
            return Err(Error::invalid_path(
                path,
                "Path is inside the metadata directory",
            ));
        }

        Ok(target)
    }

    /// Store the tree for the current index and return its digest.
    pub fn write_tree(&self) -> Result<Hash> {
        let entries = tree_entries(&self.index()?)?;
        self.store.put_tree(entries)
    }

    /// Record the staged tree as a new commit on top of HEAD.
    ///
    /// Returns `NothingToCommit` without touching the store or HEAD when the
    /// staged tree equals the tree of the HEAD commit.
    pub fn commit(&self, message: &str) -> Result<CommitOutcome> {
        let _lock = self.lock()?;

        let payload = encode_tree(tree_entries(&self.index()?)?)?;
        let tree = ObjectStore::hash_object(ObjectKind::Tree, &payload);

        let parent = self.head.get()?;
        if let Some(parent) = &parent {
            if self.store.get_commit(parent)?.tree == tree {
                debug!(%tree, "staged tree matches HEAD");
                return Ok(CommitOutcome::NothingToCommit);
            }
        }

        self.store.put(ObjectKind::Tree, &payload)?;
        let commit = Commit::new(
            tree,
            parent,
            &self.config.author,
            &self.config.committer,
            message,
        );
        let hash = self.store.put_commit(&commit)?;
        self.head.compare_and_swap(parent, &hash)?;

        info!(commit = %hash, %tree, "created commit");
        Ok(CommitOutcome::Created(hash))
    }

    /// History from HEAD back to the root commit.
    pub fn log(&self) -> Result<Vec<LogEntry>> {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.head.get()?;

        while let Some(hash) = current {
            if !seen.insert(hash) {
                return Err(Error::corrupt_history(format!(
                    "Commit {} appears twice in history",
                    hash
                )));
            }

            let commit = self.store.get_commit(&hash)?;
            current = commit.parent;
            entries.push(LogEntry { hash, commit });
        }

        Ok(entries)
    }

    /// Flattened tree of the HEAD commit; empty before the first commit.
    pub(crate) fn head_snapshot(&self) -> Result<Snapshot> {
        match self.head.get()? {
            Some(head) => {
                let commit = self.store.get_commit(&head)?;
                self.store.resolve_tree_snapshot(&commit.tree)
            }
            None => Ok(Snapshot::new()),
        }
    }

    /// Current bytes of a tracked path, or `None` if it is no longer a file.
    pub(crate) fn read_working(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let file = self.work_dir.join(path);
        if !file.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read(&file)?))
    }
}

fn tree_entries(index: &Index) -> Result<Vec<TreeEntry>> {
    index
        .iter()
        .map(|(path, hash)| TreeEntry::file(path, *hash))
        .collect()
}

impl Porcelain for Repository {}
