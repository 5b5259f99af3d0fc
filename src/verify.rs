//! Verify orchestrator: compare each tracked file against its stored record.

use anyhow::Result;
use log::{debug, info, warn};
use std::fs::File;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::db::{Backend, Field, open_for_root};
use crate::engine::digest::{Algorithm, digest_file};
use crate::engine::progress::{create_counter, refresh_bar, update_progress_bar};
use crate::engine::scanner::scan_tree;
use crate::engine::scheduler::run_scheduler;
use crate::engine::signature::signature_of;
use crate::error::CksumError;
use crate::{Opts, VerifyReport, VerifyStatus};

/// Classify one path against its stored record. Never writes.
///
/// `Unknown` and `Modified` are informational; a digest mismatch is the
/// `Integrity` error, an unreadable source the `UnreadableFile` error, both
/// subject to the fatal/continue policy.
pub fn verify_path(
    backend: &dyn Backend,
    root: &Path,
    rel: &Path,
    algo: Algorithm,
) -> Result<VerifyStatus, CksumError> {
    let abs = root.join(rel);
    // readability probe before consulting the database
    File::open(&abs).map_err(|e| CksumError::unreadable(&abs, e))?;

    let Some(stored_sig) = backend.get(rel, Field::Signature)? else {
        return Ok(VerifyStatus::Unknown);
    };
    let cur_sig = signature_of(&abs)?;
    if cur_sig != stored_sig {
        return Ok(VerifyStatus::Modified);
    }

    let computed = digest_file(&abs, algo)?;
    let stored_digest = backend.get(rel, Field::Digest)?.ok_or_else(|| {
        CksumError::db(format!(
            "{}: record has a signature but no digest",
            rel.display()
        ))
    })?;
    if computed == stored_digest {
        Ok(VerifyStatus::Ok)
    } else {
        Err(CksumError::Integrity {
            path: rel.to_path_buf(),
            stored: stored_digest,
            computed,
        })
    }
}

/// Verify every regular file under `root` against the checksum database.
/// Read-only: no record is created, changed, or removed.
pub fn verify_root(root: &Path, opts: &Opts, cancel: &Arc<AtomicBool>) -> Result<VerifyReport> {
    let (root, location, backend) = open_for_root(root, opts, false)?;
    let continue_on_error = opts.keep_going || opts.parallelism.workers > 0;
    let bar = opts.verbose.then(|| create_counter("Verifying"));
    if let Some(b) = &bar {
        refresh_bar(b);
    }

    let mut report = VerifyReport::default();
    let mut fatal: Option<CksumError> = None;
    let paths = scan_tree(&root, opts.follow_links, Some(&location));
    run_scheduler(
        paths,
        opts.parallelism,
        cancel,
        |rel| verify_path(backend.as_ref(), &root, rel, opts.algorithm),
        |rel, outcome| {
            if let Some(b) = &bar {
                update_progress_bar(b, 1);
            }
            match outcome {
                Ok(VerifyStatus::Ok) => {
                    debug!("ok: {}", rel.display());
                    report.ok += 1;
                }
                Ok(VerifyStatus::Unknown) => {
                    info!("unknown (never updated): {}", rel.display());
                    report.unknown.push(rel);
                }
                Ok(VerifyStatus::Modified) => {
                    info!("modified since last update: {}", rel.display());
                    report.modified.push(rel);
                }
                Err(e) if continue_on_error => {
                    warn!("{}", e);
                    report.failures.push((rel, e.to_string()));
                }
                Err(e) => {
                    fatal = Some(e);
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        },
    );

    if cancel.load(Ordering::Relaxed) {
        return Err(CksumError::Interrupted.into());
    }
    if let Some(e) = fatal {
        return Err(e.into());
    }
    info!(
        "{}: {} ok, {} unknown, {} modified, {} failed",
        root.display(),
        report.ok,
        report.unknown.len(),
        report.modified.len(),
        report.failures.len()
    );
    Ok(report)
}
