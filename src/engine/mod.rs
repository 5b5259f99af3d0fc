//! Engine: scanning, signatures, digests, scheduling, and the CLI surface.

pub mod arg_parser;
pub mod cli;
pub mod digest;
pub mod progress;
pub mod scanner;
pub mod scheduler;
pub mod signature;

// Re-export commonly used items
pub use arg_parser::{Cli, Commands, CommonArgs};
pub use cli::handle_run;
pub use digest::{Algorithm, digest_file};
pub use scanner::scan_tree;
pub use scheduler::{Parallelism, run_scheduler};
pub use signature::{format_signature, signature_of};
