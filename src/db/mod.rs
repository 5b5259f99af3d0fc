//! Checksum database: pluggable storage for per-file (signature, digest) records.
//!
//! Two strategies implement the same capability set: a mirrored shadow tree of
//! one-line record files, and in-place extended attributes on the source files.
//! The backend is chosen once at startup and injected into the orchestrators.

pub mod tree;
pub mod xattr;

use clap::ValueEnum;
use log::debug;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::error::CksumError;
use crate::utils::config::PackagePaths;

pub use tree::TreeBackend;
pub use xattr::XattrBackend;

/// The two fields of a file record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    /// Cheap modification signature, `"<mtime_ns>_<size>"`.
    Signature,
    /// Lowercase hex content digest.
    Digest,
}

/// Storage strategy for (signature, digest) records.
///
/// Distinct paths map to disjoint storage units (distinct record files, or
/// attribute sets on distinct source files), so concurrent workers that own
/// disjoint paths never contend and no locking is required.
pub trait Backend: Sync {
    /// One-time setup before any per-file work. With `sync_structure` (update
    /// runs only) the mirrored-tree strategy also resynchronizes its shadow
    /// structure to current source-tree existence; a no-op for in-place storage.
    fn initialize(&self, sync_structure: bool) -> Result<(), CksumError>;

    /// Read one field of the record for `rel`. `None` when no record exists.
    fn get(&self, rel: &Path, field: Field) -> Result<Option<String>, CksumError>;

    /// Create or overwrite the whole record for `rel`. There is no way to
    /// update only one field.
    fn set(&self, rel: &Path, signature: &str, digest: &str) -> Result<(), CksumError>;
}

/// Which backend implementation a run uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Mirrored shadow tree of record files next to the scanned root.
    File,
    /// Extended attributes on the source files themselves.
    Xattr,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Xattr => "xattr",
        }
    }
}

/// One record line: `"<signature> <digest>"`, no trailing newline.
pub fn join_record(signature: &str, digest: &str) -> String {
    format!("{signature} {digest}")
}

/// Split a record line into (signature, digest). The digest is the trailing
/// space-delimited token; everything before the last space is the signature.
/// `None` when the line has no separator.
pub fn split_record(line: &str) -> Option<(&str, &str)> {
    line.rsplit_once(' ')
}

/// Derive the database location for a canonicalized root: a hidden sibling
/// namespace, `prefix + parent(root) + "/." + basename(root) + "-cksumdb." + backend`.
/// The mirrored-tree strategy uses it as its shadow root; for in-place storage
/// it is informational only.
pub fn db_location(root: &Path, prefix: &str, kind: BackendKind) -> Result<PathBuf, CksumError> {
    let parent = root.parent().ok_or_else(|| {
        CksumError::db(format!(
            "{}: no parent directory to hold the database",
            root.display()
        ))
    })?;
    let base = root.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        CksumError::db(format!(
            "{}: root has no usable basename for the database name",
            root.display()
        ))
    })?;
    let dir_name = format!(".{}-{}.{}", base, PackagePaths::get().db_tag(), kind.as_str());
    Ok(PathBuf::from(format!("{}{}", prefix, parent.display())).join(dir_name))
}

/// Instantiate the configured backend. Chosen once at startup; the orchestrators
/// only ever see `dyn Backend`.
pub fn open_backend(kind: BackendKind, location: &Path, root: &Path) -> Box<dyn Backend> {
    match kind {
        BackendKind::File => Box::new(TreeBackend::new(location, root)),
        BackendKind::Xattr => Box::new(XattrBackend::new(root)),
    }
}

/// Canonicalize `root`, derive the database location, open the backend, and run
/// its one-time initialize. Returns (canonical root, location, backend).
pub fn open_for_root(
    root: &Path,
    opts: &Opts,
    sync_structure: bool,
) -> Result<(PathBuf, PathBuf, Box<dyn Backend>), CksumError> {
    let root = root
        .canonicalize()
        .map_err(|e| CksumError::Usage(format!("{}: {}", root.display(), e)))?;
    if !root.is_dir() {
        return Err(CksumError::Usage(format!(
            "{}: not a directory",
            root.display()
        )));
    }
    let location = db_location(&root, &opts.db_prefix, opts.backend)?;
    debug!(
        "database for {}: {}",
        root.display(),
        location.display()
    );
    let backend = open_backend(opts.backend, &location, &root);
    backend.initialize(sync_structure)?;
    Ok((root, location, backend))
}
