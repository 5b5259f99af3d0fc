use cksumdb::db::{BackendKind, db_location, join_record, split_record};
use cksumdb::engine::digest::{Algorithm, digest_file};
use cksumdb::engine::scheduler::Parallelism;
use cksumdb::engine::signature::format_signature;
use std::io::Write;
use std::path::{Path, PathBuf};

// --- record line format ---

#[test]
fn test_join_record_single_space_no_newline() {
    assert_eq!(join_record("100_5", "abc123"), "100_5 abc123");
}

#[test]
fn test_split_record_last_space_wins() {
    assert_eq!(split_record("100_5 abc123"), Some(("100_5", "abc123")));
    // digest is the trailing token; everything before the last space is signature
    assert_eq!(
        split_record("100_5 extra abc123"),
        Some(("100_5 extra", "abc123"))
    );
}

#[test]
fn test_split_record_no_separator() {
    assert_eq!(split_record("garbage"), None);
    assert_eq!(split_record(""), None);
}

#[test]
fn test_record_round_trip() {
    let line = join_record("1700000000000000000_4096", "deadbeef");
    assert_eq!(
        split_record(&line),
        Some(("1700000000000000000_4096", "deadbeef"))
    );
}

// --- signature format ---

#[test]
fn test_format_signature() {
    assert_eq!(format_signature(123, 45), "123_45");
    assert_eq!(format_signature(0, 0), "0_0");
}

#[test]
fn test_format_signature_pre_epoch_mtime() {
    assert_eq!(format_signature(-5, 10), "-5_10");
}

#[test]
fn test_signature_never_contains_a_space() {
    assert!(!format_signature(i128::MAX, u64::MAX).contains(' '));
}

#[test]
fn test_format_signature_past_the_i64_nanosecond_range() {
    // mtimes beyond year 2262 must not alias onto small values
    assert_eq!(
        format_signature(i64::MAX as i128 + 1, 0),
        "9223372036854775808_0"
    );
}

// --- database location derivation ---

#[test]
fn test_db_location_sibling_of_root() {
    let loc = db_location(Path::new("/data/photos"), "", BackendKind::File).unwrap();
    assert_eq!(loc, PathBuf::from("/data/.photos-cksumdb.file"));
}

#[test]
fn test_db_location_backend_suffix() {
    let loc = db_location(Path::new("/data/photos"), "", BackendKind::Xattr).unwrap();
    assert_eq!(loc, PathBuf::from("/data/.photos-cksumdb.xattr"));
}

#[test]
fn test_db_location_prefix_prepended_to_parent() {
    let loc = db_location(Path::new("/data/photos"), "/mnt/backup", BackendKind::File).unwrap();
    assert_eq!(loc, PathBuf::from("/mnt/backup/data/.photos-cksumdb.file"));
}

#[test]
fn test_db_location_filesystem_root_is_invalid() {
    assert!(db_location(Path::new("/"), "", BackendKind::File).is_err());
}

// --- parallelism parsing ---

#[test]
fn test_parallelism_workers_only_gets_default_batch() {
    let p: Parallelism = "4".parse().unwrap();
    assert_eq!(p.workers, 4);
    assert_eq!(p.batch_size, 8);
}

#[test]
fn test_parallelism_workers_and_batch() {
    let p: Parallelism = "4,16".parse().unwrap();
    assert_eq!(p, Parallelism { workers: 4, batch_size: 16 });
}

#[test]
fn test_parallelism_zero_workers_is_sequential() {
    let p: Parallelism = "0".parse().unwrap();
    assert_eq!(p.workers, 0);
}

#[test]
fn test_parallelism_auto_has_at_least_one_worker() {
    let p: Parallelism = "auto".parse().unwrap();
    assert!(p.workers >= 1);
}

#[test]
fn test_parallelism_rejects_garbage() {
    assert!("".parse::<Parallelism>().is_err());
    assert!("x".parse::<Parallelism>().is_err());
    assert!("4,y".parse::<Parallelism>().is_err());
    assert!("4,0".parse::<Parallelism>().is_err());
}

#[test]
fn test_parallelism_default_is_sequential() {
    assert_eq!(Parallelism::default(), Parallelism::sequential());
}

// --- digest provider ---

#[test]
fn test_sha256_empty_file() {
    let f = tempfile::NamedTempFile::new().unwrap();
    let digest = digest_file(f.path(), Algorithm::Sha256).unwrap();
    assert_eq!(
        digest,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_sha256_known_content() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(b"hello\n").unwrap();
    f.flush().unwrap();
    let digest = digest_file(f.path(), Algorithm::Sha256).unwrap();
    assert_eq!(
        digest,
        "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
    );
}

#[test]
fn test_digest_lengths_and_divergence_per_algorithm() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(b"hello\n").unwrap();
    f.flush().unwrap();
    let sha256 = digest_file(f.path(), Algorithm::Sha256).unwrap();
    let sha512 = digest_file(f.path(), Algorithm::Sha512).unwrap();
    let blake3 = digest_file(f.path(), Algorithm::Blake3).unwrap();
    assert_eq!(sha256.len(), 64);
    assert_eq!(sha512.len(), 128);
    assert_eq!(blake3.len(), 64);
    assert_ne!(sha256, blake3);
    for d in [&sha256, &sha512, &blake3] {
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

#[test]
fn test_digest_missing_file_is_unreadable() {
    assert!(digest_file(Path::new("/no/such/file"), Algorithm::Sha256).is_err());
}
