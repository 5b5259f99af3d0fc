//! CLI command handler: per-root loop, policy and exit-code mapping, Ctrl+C wiring.

use anyhow::{Context, Result};
use log::{debug, error};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Opts;
use crate::engine::arg_parser::{Cli, Commands, CommonArgs};
use crate::error::{CksumError, ExitCode};
use crate::update::update_root;
use crate::utils::config_file::{apply_file_to_opts, load_config_toml};
use crate::utils::setup_logging;
use crate::verify::verify_root;

/// Overlay explicit CLI flags on `opts`. Applied last, so flags win over
/// config-file values.
fn apply_cli_to_opts(common: &CommonArgs, opts: &mut Opts) {
    if let Some(b) = common.backend {
        opts.backend = b;
    }
    if let Some(ref p) = common.db_prefix {
        opts.db_prefix = p.clone();
    }
    if let Some(a) = common.algorithm {
        opts.algorithm = a;
    }
    if let Some(k) = common.keep_going {
        opts.keep_going = k;
    }
    if let Some(j) = common.jobs {
        opts.parallelism = j;
    }
    if let Some(f) = common.follow_links {
        opts.follow_links = f;
    }
    if let Some(v) = common.verbose {
        opts.verbose = v;
    }
}

/// Merge defaults < config file < CLI flags, then initialize logging.
fn setup_opts(common: &CommonArgs) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = load_config_toml(Path::new(".")) {
        apply_file_to_opts(&file, &mut opts);
    }
    apply_cli_to_opts(common, &mut opts);
    setup_logging(opts.verbose);
    opts
}

/// Whether one root's outcome fails the whole run. Forced continuation
/// (parallel workers, no keep-going) completes the scan but still fails;
/// an explicit keep-going absorbs per-file failures into warnings.
fn root_failed(had_failures: bool, keep_going: bool) -> bool {
    had_failures && !keep_going
}

/// Errors that abort the entire invocation rather than failing one root and
/// moving on: bad invocation, missing capability, user interrupt.
fn aborts_invocation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<CksumError>().is_some_and(|e| {
        matches!(
            e,
            CksumError::Usage(_) | CksumError::Environment(_) | CksumError::Interrupted
        )
    })
}

/// Run update or verify over every root in order. A fatal failure in one root
/// fails the run but does not stop the remaining roots; Usage, Environment,
/// and Interrupted abort the whole invocation.
pub fn handle_run(cli: &Cli) -> Result<ExitCode> {
    let is_update = matches!(cli.command, Commands::Update(_));
    let common = cli.common();
    let opts = setup_opts(common);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_handler = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        cancel_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let mut failed = false;
    for root in &common.roots {
        let outcome = if is_update {
            update_root(root, &opts, &cancel).map(|r| !r.errors.is_empty())
        } else {
            verify_root(root, &opts, &cancel).map(|r| !r.failures.is_empty())
        };
        match outcome {
            Ok(had_failures) => failed |= root_failed(had_failures, opts.keep_going),
            Err(err) => {
                if aborts_invocation(&err) {
                    return Err(err);
                }
                error!("{}: {:#}", root.display(), err);
                failed = true;
            }
        }
    }
    Ok(if failed {
        ExitCode::Failure
    } else {
        ExitCode::Success
    })
}
