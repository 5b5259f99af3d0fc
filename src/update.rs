//! Update orchestrator: record or refresh the (signature, digest) pair per file.

use anyhow::Result;
use log::{debug, info, warn};
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
use crate::{Opts, UpdateReport, UpdateStatus};

/// Decide and apply the update for one path.
///
/// When the stored signature matches the current one no digest is computed;
/// that short-circuit makes repeated updates over an unchanged tree cost one
/// `stat` per file instead of a content read.
pub fn update_path(
    backend: &dyn Backend,
    root: &Path,
    rel: &Path,
    algo: Algorithm,
) -> Result<UpdateStatus, CksumError> {
    let abs = root.join(rel);
    let cur_sig = signature_of(&abs)?;
    let stored = backend.get(rel, Field::Signature)?;
    if stored.as_deref() == Some(cur_sig.as_str()) {
        return Ok(UpdateStatus::Unchanged);
    }
    let digest = digest_file(&abs, algo)?;
    backend.set(rel, &cur_sig, &digest)?;
    Ok(UpdateStatus::Changed)
}

/// Update the checksum database for every regular file under `root`.
///
/// The backend's initialize (including the mirrored-tree structural resync)
/// completes fully before any worker starts. Changed paths are always reported
/// regardless of error policy.
pub fn update_root(root: &Path, opts: &Opts, cancel: &Arc<AtomicBool>) -> Result<UpdateReport> {
    let (root, location, backend) = open_for_root(root, opts, true)?;
    // one worker's fatal outcome cannot abort siblings already in flight
    let continue_on_error = opts.keep_going || opts.parallelism.workers > 0;
    let bar = opts.verbose.then(|| create_counter("Updating"));
    if let Some(b) = &bar {
        refresh_bar(b);
    }

    let mut report = UpdateReport::default();
    let mut fatal: Option<CksumError> = None;
    let paths = scan_tree(&root, opts.follow_links, Some(&location));
    run_scheduler(
        paths,
        opts.parallelism,
        cancel,
        |rel| update_path(backend.as_ref(), &root, rel, opts.algorithm),
        |rel, outcome| {
            if let Some(b) = &bar {
                update_progress_bar(b, 1);
            }
            match outcome {
                Ok(UpdateStatus::Changed) => {
                    info!("changed: {}", rel.display());
                    report.changed.push(rel);
                }
                Ok(UpdateStatus::Unchanged) => {
                    debug!("unchanged: {}", rel.display());
                    report.unchanged += 1;
                }
                Err(e) if continue_on_error => {
                    warn!("{}: {}", rel.display(), e);
                    report.errors.push((rel, e.to_string()));
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
        "{}: {} changed, {} unchanged, {} failed",
        root.display(),
        report.changed.len(),
        report.unchanged,
        report.errors.len()
    );
    Ok(report)
}
