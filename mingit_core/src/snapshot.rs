//! Flattening trees into path → blob snapshots.

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::ObjectKind;
use crate::store::ObjectStore;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Flat view of a tree: every reachable blob keyed by its full path.
pub type Snapshot = BTreeMap<String, Hash>;

impl ObjectStore {
    /// Resolve a tree and all nested subtrees into one flat snapshot.
    ///
    /// A tree entry that refers back to one of its ancestor trees is reported
    /// as corrupt history, as is an entry naming anything but a blob or tree.
    /// The same subtree may legitimately appear under several paths.
    pub fn resolve_tree_snapshot(&self, tree: &Hash) -> Result<Snapshot> {
        let mut snapshot = Snapshot::new();
        let mut ancestors = HashSet::new();
        self.resolve_into(tree, "", &mut ancestors, &mut snapshot)?;
        debug!(%tree, paths = snapshot.len(), "resolved tree snapshot");
        Ok(snapshot)
    }

    fn resolve_into(
        &self,
        tree: &Hash,
        prefix: &str,
        ancestors: &mut HashSet<Hash>,
        snapshot: &mut Snapshot,
    ) -> Result<()> {
        if !ancestors.insert(*tree) {
            return Err(Error::corrupt_history(format!(
                "Tree {} contains itself (at '{}')",
                tree, prefix
            )));
        }

        for entry in self.get_tree(tree)? {
            let path = if prefix.is_empty() {
                entry.path
            } else {
                format!("{}/{}", prefix, entry.path)
            };

            match self.kind_of(&entry.sha)? {
                ObjectKind::Blob => {
                    snapshot.insert(path, entry.sha);
                }
                ObjectKind::Tree => {
                    self.resolve_into(&entry.sha, &path, ancestors, snapshot)?;
                }
                ObjectKind::Commit => {
                    return Err(Error::corrupt_history(format!(
                        "Tree entry '{}' refers to commit {}",
                        path, entry.sha
                    )));
                }
            }
        }

        ancestors.remove(tree);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::Commit;
    use crate::tree::{TreeEntry, encode_tree, file_modes};
    use std::fs;
    use tempfile::TempDir;

    fn test_store(temp_dir: &TempDir) -> ObjectStore {
        ObjectStore::new(temp_dir.path().join("objects"))
    }

    #[test]
    fn test_flat_tree() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let a = store.put_blob(b"a").unwrap();
        let b = store.put_blob(b"b").unwrap();
        let tree = store
            .put_tree(vec![
                TreeEntry::file("a.txt", a).unwrap(),
                TreeEntry::file("dir/b.txt", b).unwrap(),
            ])
            .unwrap();

        let snapshot = store.resolve_tree_snapshot(&tree).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["a.txt"], a);
        assert_eq!(snapshot["dir/b.txt"], b);
    }

    #[test]
    fn test_nested_trees_are_prefixed() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let leaf = store.put_blob(b"leaf").unwrap();
        let inner = store
            .put_tree(vec![TreeEntry::file("leaf.txt", leaf).unwrap()])
            .unwrap();
        let middle = store
            .put_tree(vec![
                TreeEntry::new("inner", file_modes::DIRECTORY, inner).unwrap(),
            ])
            .unwrap();
        let root = store
            .put_tree(vec![
                TreeEntry::new("outer", file_modes::DIRECTORY, middle).unwrap(),
                TreeEntry::file("top.txt", leaf).unwrap(),
            ])
            .unwrap();

        let snapshot = store.resolve_tree_snapshot(&root).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["outer/inner/leaf.txt"], leaf);
        assert_eq!(snapshot["top.txt"], leaf);
    }

    #[test]
    fn test_shared_subtree_is_not_a_cycle() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let blob = store.put_blob(b"same").unwrap();
        let sub = store
            .put_tree(vec![TreeEntry::file("f", blob).unwrap()])
            .unwrap();
        let root = store
            .put_tree(vec![
                TreeEntry::new("one", file_modes::DIRECTORY, sub).unwrap(),
                TreeEntry::new("two", file_modes::DIRECTORY, sub).unwrap(),
            ])
            .unwrap();

        let snapshot = store.resolve_tree_snapshot(&root).unwrap();
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["one/f", "two/f"]);
    }

    #[test]
    fn test_cyclic_tree_is_corrupt_history() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        // Plant a tree under a digest that one of its own entries names
        let looped = Hash::hash_bytes(b"planted");
        let payload = encode_tree(vec![
            TreeEntry::new("again", file_modes::DIRECTORY, looped).unwrap(),
        ])
        .unwrap();
        let path = store.object_path(&looped);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, payload).unwrap();

        let err = store.resolve_tree_snapshot(&looped).unwrap_err();
        assert!(matches!(err, Error::CorruptHistory { .. }));
    }

    #[test]
    fn test_entry_naming_commit_is_corrupt_history() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let empty = store.put_tree(vec![]).unwrap();
        let commit = store
            .put_commit(&Commit::new(empty, None, "a", "a", "m"))
            .unwrap();
        let tree = store
            .put_tree(vec![TreeEntry::file("weird", commit).unwrap()])
            .unwrap();

        let err = store.resolve_tree_snapshot(&tree).unwrap_err();
        assert!(matches!(err, Error::CorruptHistory { .. }));
    }

    #[test]
    fn test_missing_entry_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let tree = store
            .put_tree(vec![
                TreeEntry::file("ghost", Hash::hash_bytes(b"never stored")).unwrap(),
            ])
            .unwrap();

        let err = store.resolve_tree_snapshot(&tree).unwrap_err();
        assert!(err.is_not_found());
    }
}
