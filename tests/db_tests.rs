//! Backend behavior: record files, structural resync, extended attributes.

use cksumdb::db::{Backend, Field, TreeBackend};
use std::fs;
use std::path::{Path, PathBuf};

fn tree_fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("root");
    let shadow = dir.path().join(".root-cksumdb.file");
    fs::create_dir(&root).unwrap();
    (dir, root, shadow)
}

// --- mirrored-tree backend: initialize ---

#[test]
fn test_initialize_creates_the_shadow_root() {
    let (_dir, root, shadow) = tree_fixture();
    let backend = TreeBackend::new(&shadow, &root);
    backend.initialize(false).unwrap();
    assert!(shadow.is_dir());
}

#[test]
fn test_initialize_rejects_a_non_directory_shadow_path() {
    let (_dir, root, shadow) = tree_fixture();
    fs::write(&shadow, "not a directory").unwrap();
    let backend = TreeBackend::new(&shadow, &root);
    assert!(backend.initialize(false).is_err());
}

// --- mirrored-tree backend: get / set ---

#[test]
fn test_get_missing_record_is_none() {
    let (_dir, root, shadow) = tree_fixture();
    let backend = TreeBackend::new(&shadow, &root);
    backend.initialize(false).unwrap();
    assert_eq!(backend.get(Path::new("a.txt"), Field::Signature).unwrap(), None);
    assert_eq!(backend.get(Path::new("a.txt"), Field::Digest).unwrap(), None);
}

#[test]
fn test_set_then_get_round_trips_both_fields() {
    let (_dir, root, shadow) = tree_fixture();
    let backend = TreeBackend::new(&shadow, &root);
    backend.initialize(false).unwrap();
    backend.set(Path::new("a.txt"), "123_5", "deadbeef").unwrap();
    assert_eq!(
        backend.get(Path::new("a.txt"), Field::Signature).unwrap().as_deref(),
        Some("123_5")
    );
    assert_eq!(
        backend.get(Path::new("a.txt"), Field::Digest).unwrap().as_deref(),
        Some("deadbeef")
    );
    // on disk: exactly one line, single space, no trailing newline
    assert_eq!(
        fs::read_to_string(shadow.join("a.txt")).unwrap(),
        "123_5 deadbeef"
    );
}

#[test]
fn test_set_overwrites_the_whole_record() {
    let (_dir, root, shadow) = tree_fixture();
    let backend = TreeBackend::new(&shadow, &root);
    backend.initialize(false).unwrap();
    backend.set(Path::new("a.txt"), "1_1", "aaaa").unwrap();
    backend.set(Path::new("a.txt"), "2_2", "bbbb").unwrap();
    assert_eq!(fs::read_to_string(shadow.join("a.txt")).unwrap(), "2_2 bbbb");
}

#[test]
fn test_set_fails_when_parent_directory_is_missing() {
    let (_dir, root, shadow) = tree_fixture();
    let backend = TreeBackend::new(&shadow, &root);
    backend.initialize(false).unwrap();
    // parents come from the structural resync, never from set
    assert!(backend.set(Path::new("sub/a.txt"), "1_1", "aaaa").is_err());
}

#[test]
fn test_set_replaces_a_stale_directory_at_the_record_path() {
    let (_dir, root, shadow) = tree_fixture();
    let backend = TreeBackend::new(&shadow, &root);
    backend.initialize(false).unwrap();
    fs::create_dir(shadow.join("a.txt")).unwrap();
    backend.set(Path::new("a.txt"), "1_1", "aaaa").unwrap();
    assert!(shadow.join("a.txt").is_file());
}

#[test]
fn test_get_rejects_a_record_without_a_separator() {
    let (_dir, root, shadow) = tree_fixture();
    let backend = TreeBackend::new(&shadow, &root);
    backend.initialize(false).unwrap();
    fs::write(shadow.join("a.txt"), "garbage").unwrap();
    assert!(backend.get(Path::new("a.txt"), Field::Signature).is_err());
}

// --- mirrored-tree backend: structural resync ---

#[test]
fn test_resync_mirrors_new_source_directories() {
    let (_dir, root, shadow) = tree_fixture();
    fs::create_dir_all(root.join("sub/deeper")).unwrap();
    fs::write(root.join("sub/deeper/a.txt"), "x").unwrap();
    let backend = TreeBackend::new(&shadow, &root);
    backend.initialize(true).unwrap();
    assert!(shadow.join("sub/deeper").is_dir());
    backend
        .set(Path::new("sub/deeper/a.txt"), "1_1", "aaaa")
        .unwrap();
}

#[test]
fn test_resync_keeps_records_whose_source_still_exists() {
    let (_dir, root, shadow) = tree_fixture();
    fs::write(root.join("a.txt"), "x").unwrap();
    let backend = TreeBackend::new(&shadow, &root);
    backend.initialize(true).unwrap();
    backend.set(Path::new("a.txt"), "1_1", "aaaa").unwrap();
    backend.initialize(true).unwrap();
    assert_eq!(fs::read_to_string(shadow.join("a.txt")).unwrap(), "1_1 aaaa");
}

#[test]
fn test_resync_prunes_records_for_deleted_files() {
    let (_dir, root, shadow) = tree_fixture();
    fs::write(root.join("a.txt"), "x").unwrap();
    fs::write(root.join("b.txt"), "y").unwrap();
    let backend = TreeBackend::new(&shadow, &root);
    backend.initialize(true).unwrap();
    backend.set(Path::new("a.txt"), "1_1", "aaaa").unwrap();
    backend.set(Path::new("b.txt"), "2_2", "bbbb").unwrap();

    fs::remove_file(root.join("b.txt")).unwrap();
    backend.initialize(true).unwrap();
    assert!(shadow.join("a.txt").is_file());
    assert!(!shadow.join("b.txt").exists());
}

#[test]
fn test_resync_prunes_directories_for_deleted_subtrees() {
    let (_dir, root, shadow) = tree_fixture();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub/a.txt"), "x").unwrap();
    fs::write(root.join("top.txt"), "y").unwrap();
    let backend = TreeBackend::new(&shadow, &root);
    backend.initialize(true).unwrap();
    backend.set(Path::new("sub/a.txt"), "1_1", "aaaa").unwrap();
    backend.set(Path::new("top.txt"), "2_2", "bbbb").unwrap();

    fs::remove_dir_all(root.join("sub")).unwrap();
    backend.initialize(true).unwrap();
    assert!(!shadow.join("sub").exists());
    assert!(shadow.join("top.txt").is_file());
}

#[test]
fn test_resync_replaces_a_stale_record_where_a_directory_now_lives() {
    let (_dir, root, shadow) = tree_fixture();
    fs::write(root.join("thing"), "was a file").unwrap();
    let backend = TreeBackend::new(&shadow, &root);
    backend.initialize(true).unwrap();
    backend.set(Path::new("thing"), "1_1", "aaaa").unwrap();

    // source file becomes a directory of the same name
    fs::remove_file(root.join("thing")).unwrap();
    fs::create_dir(root.join("thing")).unwrap();
    fs::write(root.join("thing/inner.txt"), "z").unwrap();
    backend.initialize(true).unwrap();
    assert!(shadow.join("thing").is_dir());
    backend
        .set(Path::new("thing/inner.txt"), "2_2", "bbbb")
        .unwrap();
}

// --- in-place backend ---

#[cfg(target_os = "linux")]
mod xattr_backend {
    use super::*;
    use cksumdb::db::XattrBackend;

    /// Skips when the filesystem under the tempdir has no user xattr support.
    fn open(root: &Path) -> Option<XattrBackend> {
        let backend = XattrBackend::new(root);
        match backend.initialize(false) {
            Ok(()) => Some(backend),
            Err(e) => {
                eprintln!("skip: {e}");
                None
            }
        }
    }

    #[test]
    fn test_xattr_round_trips_both_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let Some(backend) = open(dir.path()) else { return };
        let rel = Path::new("a.txt");
        assert_eq!(backend.get(rel, Field::Signature).unwrap(), None);
        backend.set(rel, "123_5", "cafe").unwrap();
        assert_eq!(backend.get(rel, Field::Signature).unwrap().as_deref(), Some("123_5"));
        assert_eq!(backend.get(rel, Field::Digest).unwrap().as_deref(), Some("cafe"));
    }

    #[test]
    fn test_xattr_set_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let Some(backend) = open(dir.path()) else { return };
        assert!(backend.set(Path::new("absent.txt"), "1_1", "aaaa").is_err());
    }
}
