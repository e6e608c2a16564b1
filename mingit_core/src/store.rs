//! Content-addressed object storage.

use crate::commit::Commit;
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{self, ObjectKind};
use crate::tree::{self, TreeEntry};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A content-addressed object store rooted at an `objects/` directory.
///
/// Objects live at `objects/<2 hex>/<62 hex>`. The store only grows: there is
/// no deletion, no compression, and no hash verification on read.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    /// Create a store handle over an existing or new objects directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The `objects` directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of an object: `<root>/<shard>/<object_name>`.
    pub fn object_path(&self, hash: &Hash) -> PathBuf {
        self.root.join(hash.shard()).join(hash.object_name())
    }

    /// Whether an object with this hash is stored.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.object_path(hash).is_file()
    }

    /// Compute the digest an object would get, without writing it.
    pub fn hash_object(kind: ObjectKind, payload: &[u8]) -> Hash {
        object::digest(kind, payload)
    }

    /// Encode, hash and store an object. Returns its digest.
    ///
    /// Storing an object that already exists is a no-op.
    pub fn put(&self, kind: ObjectKind, payload: &[u8]) -> Result<Hash> {
        let encoded = object::encode(kind, payload);
        let hash = Hash::hash_bytes(&encoded);

        // Same bytes, same name: already stored
        if self.contains(&hash) {
            debug!(%hash, kind = kind.as_str(), "object already stored");
            return Ok(hash);
        }

        self.write_object_atomic(&hash, &encoded)?;
        debug!(%hash, kind = kind.as_str(), size = encoded.len(), "stored object");

        Ok(hash)
    }

    /// Read an object and strip its header.
    pub fn get(&self, hash: &Hash) -> Result<(ObjectKind, Vec<u8>)> {
        let obj_path = self.object_path(hash);
        let data = match fs::read(&obj_path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::object_not_found(hash.to_hex()));
            }
            Err(e) => return Err(e.into()),
        };

        object::decode(&obj_path, &data)
    }

    /// Read only the kind of a stored object.
    pub fn kind_of(&self, hash: &Hash) -> Result<ObjectKind> {
        self.get(hash).map(|(kind, _)| kind)
    }

    /// Re-hash a stored object and compare with its name.
    pub fn verify(&self, hash: &Hash) -> Result<bool> {
        let (kind, payload) = self.get(hash)?;
        Ok(Self::hash_object(kind, &payload) == *hash)
    }

    /// Write through a temp file in the shard and rename into place.
    fn write_object_atomic(&self, hash: &Hash, encoded: &[u8]) -> Result<()> {
        let obj_path = self.object_path(hash);
        let shard = self.root.join(hash.shard());

        fs::create_dir_all(&shard)?;

        let mut temp_file = tempfile::NamedTempFile::new_in(&shard)?;
        temp_file.write_all(encoded)?;
        temp_file.flush()?;

        temp_file.persist(&obj_path)?;

        Ok(())
    }

    /// Store file content as a blob.
    pub fn put_blob(&self, data: &[u8]) -> Result<Hash> {
        self.put(ObjectKind::Blob, data)
    }

    /// Retrieve blob content by hash.
    pub fn get_blob(&self, hash: &Hash) -> Result<Vec<u8>> {
        match self.get(hash)? {
            (ObjectKind::Blob, payload) => Ok(payload),
            (kind, _) => Err(Error::corrupted_object(
                self.object_path(hash),
                format!("Expected blob, found {}", kind.as_str()),
            )),
        }
    }

    /// Store a tree from a list of entries.
    ///
    /// Entries are sorted by path for canonical ordering.
    pub fn put_tree(&self, entries: Vec<TreeEntry>) -> Result<Hash> {
        let payload = tree::encode_tree(entries)?;
        self.put(ObjectKind::Tree, &payload)
    }

    /// Retrieve a tree by hash.
    pub fn get_tree(&self, hash: &Hash) -> Result<Vec<TreeEntry>> {
        let obj_path = self.object_path(hash);
        match self.get(hash)? {
            (ObjectKind::Tree, payload) => tree::decode_tree(&obj_path, &payload),
            (kind, _) => Err(Error::corrupted_object(
                obj_path,
                format!("Expected tree, found {}", kind.as_str()),
            )),
        }
    }

    /// Store a commit.
    pub fn put_commit(&self, commit: &Commit) -> Result<Hash> {
        let payload = commit.encode()?;
        self.put(ObjectKind::Commit, &payload)
    }

    /// Retrieve a commit by hash.
    ///
    /// Anything stored under the hash that is not a decodable commit is
    /// reported as corrupt history.
    pub fn get_commit(&self, hash: &Hash) -> Result<Commit> {
        let (kind, payload) = self.get(hash).map_err(|e| match e {
            Error::CorruptedObject { reason, .. } => {
                Error::corrupt_history(format!("Commit {} is unreadable: {}", hash, reason))
            }
            other => other,
        })?;

        if kind != ObjectKind::Commit {
            return Err(Error::corrupt_history(format!(
                "Object {} is a {}, not a commit",
                hash,
                kind.as_str()
            )));
        }

        Commit::decode(hash, &payload)
    }
}
