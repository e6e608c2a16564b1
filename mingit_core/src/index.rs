//! The staging index: repository-relative path to blob digest.
//!
//! Persisted as one JSON object whose key order is the insertion order, so
//! status output stays in the order paths were first staged.

use crate::error::{Error, Result};
use crate::hash::Hash;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Insertion-ordered mapping of staged paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: Vec<(String, Hash)>,
    positions: HashMap<String, usize>,
}

impl Index {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index file. A missing file is an empty index.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&data)
            .map_err(|e| Error::corrupted_object(path, format!("Invalid index: {}", e)))
    }

    /// Replace the index file with this mapping.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| Error::invalid_path(path, "Index has no parent directory"))?;

        let payload = serde_json::to_vec_pretty(self).map_err(std::io::Error::from)?;
        let mut temp_file = tempfile::NamedTempFile::new_in(dir)?;
        temp_file.write_all(&payload)?;
        temp_file.flush()?;
        temp_file.persist(path)?;

        Ok(())
    }

    /// Insert or update a path in memory. Returns true if the mapping changed.
    pub fn insert(&mut self, path: impl Into<String>, hash: Hash) -> bool {
        let path = path.into();
        match self.positions.get(&path) {
            Some(&pos) => {
                let slot = &mut self.entries[pos].1;
                let changed = *slot != hash;
                *slot = hash;
                changed
            }
            None => {
                self.positions.insert(path.clone(), self.entries.len());
                self.entries.push((path, hash));
                true
            }
        }
    }

    /// Insert or update a path and persist the index to `index_path`.
    pub fn stage(&mut self, index_path: &Path, path: impl Into<String>, hash: Hash) -> Result<()> {
        self.insert(path, hash);
        self.save(index_path)
    }

    /// Staged digest for a path.
    pub fn get(&self, path: &str) -> Option<&Hash> {
        self.positions.get(path).map(|&pos| &self.entries[pos].1)
    }

    /// Whether the path is tracked.
    pub fn contains(&self, path: &str) -> bool {
        self.positions.contains_key(path)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Hash)> {
        self.entries.iter().map(|(path, hash)| (path.as_str(), hash))
    }

    /// Number of staged paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Default location of the index inside a metadata directory.
    pub fn default_path(meta_dir: &Path) -> PathBuf {
        meta_dir.join("index")
    }
}

impl Serialize for Index {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(path, hash)| (path, hash)))
    }
}

impl<'de> Deserialize<'de> for Index {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct IndexVisitor;

        impl<'de> Visitor<'de> for IndexVisitor {
            type Value = Index;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of paths to hex digests")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Index, A::Error> {
                let mut index = Index::new();
                while let Some((path, hash)) = access.next_entry::<String, Hash>()? {
                    index.insert(path, hash);
                }
                Ok(index)
            }
        }

        deserializer.deserialize_map(IndexVisitor)
    }
}
