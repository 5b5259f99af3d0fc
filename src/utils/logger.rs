//! Logging setup: quiet dependencies, colored per-level prefixes.

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Dependencies stay at Warn; this crate logs at Info, or Debug with
/// `--verbose`. Per-file outcomes land at info (changed/modified/unknown) or
/// debug (unchanged/ok); absorbed failures log at Warn and fatal ones at
/// Error, so on a long scan the prefix color is the fastest read.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            let prefix = match record.level() {
                Level::Error => format!("[{name} {}]", "ERROR".red()),
                Level::Warn => format!("[{name} {}]", "WARN".yellow()),
                // module path only in debug output, where it earns its width
                Level::Debug | Level::Trace => {
                    format!("[{name} {}]", record.target().dimmed())
                }
                Level::Info => format!("[{name}]"),
            };
            writeln!(buf, "{prefix} {}", record.args())
        })
        .init();
}
