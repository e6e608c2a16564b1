use mingit_core::{
    ChangeKind, CommitOutcome, GlobIgnore, ObjectKind, Patch, PathState, Repository, StagedChange,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn object_files(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(object_files(&path));
        } else {
            files.push(path);
        }
    }
    files
}

#[test]
fn test_first_commit_then_clean() {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();
    fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();

    repo.add("a.txt").unwrap();
    let outcome = repo.commit("first").unwrap();
    assert!(matches!(outcome, CommitOutcome::Created(_)));

    let status = repo.status().unwrap();
    assert!(status.is_clean());
    assert_eq!(status.to_string(), "nothing to commit, working tree clean\n");
}

#[test]
fn test_overwrite_shows_unstaged_and_diff() {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();
    let file = temp_dir.path().join("a.txt");
    fs::write(&file, "hello").unwrap();
    repo.add("a.txt").unwrap();
    repo.commit("first").unwrap();

    fs::write(&file, "hello world").unwrap();

    let status = repo.status().unwrap();
    assert_eq!(
        status.to_string(),
        "Changes not staged for commit:\n\tmodified: a.txt\n"
    );

    let diffs = repo.diff().unwrap();
    assert_eq!(diffs.len(), 1);
    let rendered = diffs[0].to_string();
    assert!(rendered.starts_with("diff --git a/a.txt b/a.txt\n"));
    assert!(rendered.contains("--- a/a.txt\n+++ b/a.txt\n"));
    assert!(rendered.contains("\n-hello\n+hello world\n"));
}

#[test]
fn test_new_file_is_staged_new() {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();
    fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();
    repo.add("a.txt").unwrap();
    repo.commit("first").unwrap();

    fs::write(temp_dir.path().join("b.txt"), "bee").unwrap();
    repo.add("b.txt").unwrap();

    let status = repo.status().unwrap();
    assert_eq!(
        status.staged,
        vec![StagedChange {
            path: "b.txt".to_string(),
            kind: ChangeKind::NewFile,
        }]
    );
    assert_eq!(
        status.to_string(),
        "Changes to be committed:\n\tnew file: b.txt\n"
    );
}

#[test]
fn test_identical_content_stored_once() {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();
    fs::write(temp_dir.path().join("x.txt"), "dup").unwrap();
    fs::write(temp_dir.path().join("y.txt"), "dup").unwrap();

    let report = repo.add(".").unwrap();
    assert_eq!(report.staged, vec!["x.txt", "y.txt"]);

    let index = repo.index().unwrap();
    assert_eq!(index.get("x.txt"), index.get("y.txt"));
    assert_eq!(object_files(repo.store().root()).len(), 1);

    let tree = repo.write_tree().unwrap();
    let entries = repo.store().get_tree(&tree).unwrap();
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["x.txt", "y.txt"]);
    assert_eq!(entries[0].sha, entries[1].sha);
}

#[test]
fn test_index_keeps_insertion_order() {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();
    for name in ["zeta", "alpha", "mid"] {
        fs::write(temp_dir.path().join(name), name).unwrap();
        repo.add(name).unwrap();
    }

    let raw = fs::read_to_string(repo.index_path()).unwrap();
    let zeta = raw.find("\"zeta\"").unwrap();
    let alpha = raw.find("\"alpha\"").unwrap();
    let mid = raw.find("\"mid\"").unwrap();
    assert!(zeta < alpha && alpha < mid);

    let status = repo.status().unwrap();
    assert_eq!(status.tracked, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_glob_ignore_prunes_add_and_status() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let repo = Repository::init(root).unwrap();
    let repo = repo.with_ignore(GlobIgnore::new(root, ["target/", "*.log"]).unwrap());

    fs::create_dir_all(root.join("target/debug")).unwrap();
    fs::write(root.join("target/debug/app"), "bin").unwrap();
    fs::write(root.join("run.log"), "log").unwrap();
    fs::write(root.join("main.rs"), "fn main() {}").unwrap();

    let report = repo.add(".").unwrap();
    assert_eq!(report.staged, vec!["main.rs"]);

    let status = repo.status().unwrap();
    assert!(status.untracked.is_empty());
}

#[test]
fn test_commit_persists_across_open() {
    let temp_dir = TempDir::new().unwrap();
    let hash = {
        let repo = Repository::init(temp_dir.path()).unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        repo.add("a.txt").unwrap();
        match repo.commit("first").unwrap() {
            CommitOutcome::Created(hash) => hash,
            CommitOutcome::NothingToCommit => panic!("expected a commit"),
        }
    };

    let repo = Repository::open(temp_dir.path()).unwrap();
    assert_eq!(repo.head().unwrap(), Some(hash));
    assert_eq!(repo.store().kind_of(&hash).unwrap(), ObjectKind::Commit);
    assert_eq!(repo.log().unwrap()[0].commit.message, "first");
}

#[test]
fn test_binary_file_diff_marker() {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();
    let file = temp_dir.path().join("logo.bin");
    fs::write(&file, b"\x89PNG\x00\x01").unwrap();
    repo.add("logo.bin").unwrap();
    fs::write(&file, b"\x89PNG\x00\x02").unwrap();

    let diffs = repo.diff().unwrap();
    assert_eq!(diffs[0].patch, Patch::Binary);
    assert!(
        diffs[0]
            .to_string()
            .ends_with("Binary files a/logo.bin and b/logo.bin differ\n")
    );
}

// ============================================================================
// Property tests
// ============================================================================

/// File names end in `.txt` and directory names never contain a dot, so no
/// generated file path is a directory of another.
fn arb_files() -> impl Strategy<Value = HashMap<String, Vec<u8>>> {
    prop::collection::hash_map(
        "[a-z]{1,6}(/[a-z]{1,6}){0,2}\\.txt",
        prop::collection::vec(any::<u8>(), 0..64),
        1..12,
    )
}

fn write_files(root: &Path, files: &HashMap<String, Vec<u8>>) {
    for (path, data) in files {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, data).unwrap();
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        max_shrink_iters: 1000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_tree_resolves_to_index(files in arb_files()) {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();
        write_files(temp_dir.path(), &files);
        repo.add(".").unwrap();

        let tree = repo.write_tree().unwrap();
        let snapshot = repo.store().resolve_tree_snapshot(&tree).unwrap();

        let index = repo.index().unwrap();
        let expected: BTreeMap<String, _> = index
            .iter()
            .map(|(path, hash)| (path.to_string(), *hash))
            .collect();
        prop_assert_eq!(snapshot, expected);
        prop_assert_eq!(index.len(), files.len());
    }

    #[test]
    fn prop_second_commit_is_noop(files in arb_files()) {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();
        write_files(temp_dir.path(), &files);
        repo.add(".").unwrap();

        let first = repo.commit("first").unwrap();
        prop_assert!(matches!(first, CommitOutcome::Created(_)));
        let head = repo.head().unwrap();

        prop_assert_eq!(repo.commit("second").unwrap(), CommitOutcome::NothingToCommit);
        prop_assert_eq!(repo.head().unwrap(), head);
    }

    #[test]
    fn prop_every_path_has_one_state(
        files in arb_files(),
        staged_mask in prop::collection::vec(any::<bool>(), 12),
        commit_mask in prop::collection::vec(any::<bool>(), 12),
        edit_mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let repo = Repository::init(root).unwrap();
        write_files(root, &files);

        let mut paths: Vec<&String> = files.keys().collect();
        paths.sort();

        for (i, path) in paths.iter().enumerate() {
            if commit_mask[i] {
                repo.add(path.as_str()).unwrap();
            }
        }
        repo.commit("base").unwrap();

        for (i, path) in paths.iter().enumerate() {
            if staged_mask[i] {
                repo.add(path.as_str()).unwrap();
            }
            if edit_mask[i] {
                let mut data = files[*path].clone();
                data.push(b'!');
                fs::write(root.join(path), data).unwrap();
            }
        }

        let status = repo.status().unwrap();
        let states = status.classify();

        // Every file on disk appears exactly once
        prop_assert_eq!(states.len(), files.len());
        let mut seen: Vec<&str> = states.iter().map(|(p, _)| p.as_str()).collect();
        seen.sort();
        seen.dedup();
        prop_assert_eq!(seen.len(), files.len());

        for (path, state) in &states {
            let tracked = status.tracked.contains(path);
            prop_assert_eq!(tracked, *state != PathState::Untracked);
            if status.unstaged.contains(path) {
                prop_assert_eq!(*state, PathState::Modified);
            }
        }
    }
}
