//! Public types: run configuration and per-run reports.

use std::path::PathBuf;

use crate::db::BackendKind;
use crate::engine::digest::Algorithm;
use crate::engine::scheduler::Parallelism;

/// Immutable run configuration, built once and passed by reference to every
/// component. No component reads ambient global state.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Storage backend for (signature, digest) records.
    pub backend: BackendKind,
    /// Prepended to the database location's parent path (e.g. to keep shadow
    /// trees on another volume). Empty by default.
    pub db_prefix: String,
    /// Content hash algorithm. The database does not record it, so switching
    /// algorithms over a live database makes verify fail until the next update.
    pub algorithm: Algorithm,
    /// Downgrade per-file failures to warnings and keep scanning.
    pub keep_going: bool,
    /// Worker pool shape. Zero workers runs sequentially in the invoking thread.
    pub parallelism: Parallelism,
    /// Follow symbolic links while scanning.
    pub follow_links: bool,
    /// Progress counter and debug logging.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            backend: BackendKind::File,
            db_prefix: String::new(),
            algorithm: Algorithm::Sha256,
            keep_going: false,
            parallelism: Parallelism::sequential(),
            follow_links: false,
            verbose: false,
        }
    }
}

/// Per-file outcome of an update pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateStatus {
    /// A new digest was computed and stored.
    Changed,
    /// The stored signature matched; no digest was computed.
    Unchanged,
}

/// Per-file outcome of a verify pass. The fatal outcomes (corrupt, unreadable)
/// are expressed as errors, not variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyStatus {
    /// Stored and computed digests agree.
    Ok,
    /// No record exists; the file never passed through update.
    Unknown,
    /// The signature moved on since the last update; content not compared.
    Modified,
}

/// Aggregated result of one update run over one root.
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub changed: Vec<PathBuf>,
    pub unchanged: usize,
    /// Per-file failures the continue-on-error policy carried past.
    pub errors: Vec<(PathBuf, String)>,
}

/// Aggregated result of one verify run over one root.
#[derive(Debug, Default)]
pub struct VerifyReport {
    pub ok: usize,
    pub unknown: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    /// Corrupt or unreadable files the continue-on-error policy carried past.
    pub failures: Vec<(PathBuf, String)>,
}
