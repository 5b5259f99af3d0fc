//! Shared utilities: configuration, logging, FD limits.

pub mod config;
pub mod config_file;
pub mod fd_limit;
pub mod logger;

pub use config::PackagePaths;
pub use fd_limit::{FDS_PER_WORKER, max_open_fds, max_workers_by_fd_limit};
pub use logger::setup_logging;
