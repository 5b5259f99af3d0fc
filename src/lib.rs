//! Cksumdb: checksum database for directory trees.
//!
//! Records a per-file fingerprint (content digest plus a cheap mtime/size
//! signature) in a pluggable database, then re-derives and compares on demand
//! to catch silent corruption, unexpected modification, and unreviewed files.

pub mod db;
pub mod engine;
pub mod error;
pub mod types;
pub mod update;
pub mod utils;
pub mod verify;

/// Re-export types for API
pub use error::{CksumError, ExitCode};
pub use types::*;

use log::debug;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Result alias used by the public cksumdb API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Update the checksum database for `root`: store a fresh (signature, digest)
/// record for every file whose signature moved, skip the rest.
pub fn update_tree(root: &Path, opts: &Opts) -> Result<UpdateReport> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    update::update_root(root, opts, &Arc::new(AtomicBool::new(false)))
}

/// Verify every file under `root` against the checksum database. Read-only.
pub fn verify_tree(root: &Path, opts: &Opts) -> Result<VerifyReport> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    verify::verify_root(root, opts, &Arc::new(AtomicBool::new(false)))
}
