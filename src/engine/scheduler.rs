//! Bounded worker pool: batches of paths fanned out over a fixed set of workers.
//!
//! The feeder thread groups scanned paths into batches and sends them over a
//! bounded channel whose capacity, together with the fixed worker set, is the
//! admitted-concurrency ceiling. Workers push outcomes into a second bounded
//! channel drained by the invoking thread, which does all aggregation.

use crossbeam_channel::bounded;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::error::CksumError;
use crate::utils::config::SchedulerConsts;
use crate::utils::fd_limit::max_workers_by_fd_limit;

/// Worker pool shape. `workers == 0` runs strictly sequentially in the invoking
/// thread: no channels, no threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parallelism {
    pub workers: usize,
    pub batch_size: usize,
}

impl Parallelism {
    /// Strictly sequential execution.
    pub fn sequential() -> Self {
        Self {
            workers: 0,
            batch_size: SchedulerConsts::DEFAULT_BATCH_SIZE,
        }
    }

    /// One worker per available thread, capped by the FD soft limit.
    pub fn auto() -> Self {
        let mut workers = rayon::current_num_threads().max(1);
        if let Some(cap) = max_workers_by_fd_limit() {
            workers = workers.min(cap.max(1));
        }
        Self {
            workers,
            batch_size: SchedulerConsts::DEFAULT_BATCH_SIZE,
        }
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        Self::sequential()
    }
}

impl FromStr for Parallelism {
    type Err = String;

    /// `<workers>[,<batch>]`, or `auto` for one worker per available thread.
    fn from_str(s: &str) -> Result<Self, String> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::auto());
        }
        let (workers, batch) = match s.split_once(',') {
            Some((w, b)) => (w, Some(b)),
            None => (s, None),
        };
        let workers = workers
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid worker count in {s:?}"))?;
        let batch_size = match batch {
            Some(b) => {
                let n = b
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| format!("invalid batch size in {s:?}"))?;
                if n == 0 {
                    return Err(format!("batch size must be at least 1 in {s:?}"));
                }
                n
            }
            None => SchedulerConsts::DEFAULT_BATCH_SIZE,
        };
        Ok(Self {
            workers,
            batch_size,
        })
    }
}

/// clap value parser for `--jobs`.
pub fn parse_parallelism(s: &str) -> Result<Parallelism, String> {
    s.parse()
}

/// Drive `work` over every scanned path and hand each outcome to `on_outcome`
/// on the invoking thread.
///
/// Each path is owned by exactly one worker for the duration of its processing;
/// distinct paths map to disjoint storage units, so the backends need no
/// locking. No ordering is guaranteed across paths. `on_outcome` may return
/// `ControlFlow::Break` to stop a sequential run early; with workers in flight
/// the remaining outcomes are still drained, because a sibling worker cannot be
/// aborted synchronously. Cancellation stops the feeder from admitting batches
/// and workers between paths; in-flight work is best-effort, not transactional.
pub fn run_scheduler<I, R, F, G>(
    paths: I,
    par: Parallelism,
    cancel: &Arc<AtomicBool>,
    work: F,
    mut on_outcome: G,
) where
    I: Iterator<Item = Result<PathBuf, CksumError>> + Send,
    R: Send,
    F: Fn(&Path) -> Result<R, CksumError> + Sync,
    G: FnMut(PathBuf, Result<R, CksumError>) -> ControlFlow<()>,
{
    if par.workers == 0 {
        for item in paths {
            if cancel.load(Ordering::Relaxed) {
                return;
            }
            let flow = match item {
                Ok(path) => {
                    let outcome = work(&path);
                    on_outcome(path, outcome)
                }
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    on_outcome(path, Err(err))
                }
            };
            if flow.is_break() {
                return;
            }
        }
        return;
    }

    thread::scope(|s| {
        let (batch_tx, batch_rx) = bounded::<Vec<PathBuf>>(par.workers);
        let (outcome_tx, outcome_rx) =
            bounded::<(PathBuf, Result<R, CksumError>)>(SchedulerConsts::OUTCOME_CHANNEL_CAP);

        let feeder_outcomes = outcome_tx.clone();
        let feeder_cancel = Arc::clone(cancel);
        s.spawn(move || {
            let mut batch = Vec::with_capacity(par.batch_size);
            for item in paths {
                if feeder_cancel.load(Ordering::Relaxed) {
                    return;
                }
                match item {
                    Ok(path) => {
                        batch.push(path);
                        if batch.len() == par.batch_size {
                            let full =
                                std::mem::replace(&mut batch, Vec::with_capacity(par.batch_size));
                            if batch_tx.send(full).is_err() {
                                return;
                            }
                        }
                    }
                    Err(err) => {
                        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                        if feeder_outcomes.send((path, Err(err))).is_err() {
                            return;
                        }
                    }
                }
            }
            if !batch.is_empty() {
                let _ = batch_tx.send(batch);
            }
        });

        for _ in 0..par.workers {
            let batch_rx = batch_rx.clone();
            let outcome_tx = outcome_tx.clone();
            let worker_cancel = Arc::clone(cancel);
            let work = &work;
            s.spawn(move || {
                while let Ok(batch) = batch_rx.recv() {
                    for path in batch {
                        if worker_cancel.load(Ordering::Relaxed) {
                            return;
                        }
                        let outcome = work(&path);
                        if outcome_tx.send((path, outcome)).is_err() {
                            return;
                        }
                    }
                }
            });
        }

        // Dropping the invoking thread's handles lets the drain loop end when
        // the feeder and every worker are done.
        drop(batch_rx);
        drop(outcome_tx);
        while let Ok((path, outcome)) = outcome_rx.recv() {
            let _ = on_outcome(path, outcome);
        }
    });
}
