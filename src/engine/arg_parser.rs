use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::db::BackendKind;
use crate::engine::digest::Algorithm;
use crate::engine::scheduler::{Parallelism, parse_parallelism};

/// Checksum database for directory trees.
#[derive(Clone, Parser)]
#[command(name = "cksumdb")]
#[command(about = "Record per-file checksums and verify them later to catch silent corruption.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Record or refresh the checksum database for each root.
    Update(CommonArgs),
    /// Compare each tracked file against its stored checksum.
    Verify(CommonArgs),
}

#[derive(Clone, Args)]
pub struct CommonArgs {
    /// Directories to process, in order.
    #[arg(value_name = "ROOT", required = true)]
    pub roots: Vec<PathBuf>,

    /// Storage backend: a mirrored shadow tree of record files, or extended
    /// attributes on the files themselves.
    #[arg(long, short = 'b', value_enum)]
    pub backend: Option<BackendKind>,

    /// Prefix prepended to the database location (keep shadow trees elsewhere).
    #[arg(long, short = 'p', value_name = "STRING")]
    pub db_prefix: Option<String>,

    /// Content hash algorithm.
    #[arg(long, short = 'a', value_enum)]
    pub algorithm: Option<Algorithm>,

    /// Keep going past per-file failures (downgrade to warnings).
    #[arg(long, short = 'k', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub keep_going: Option<bool>,

    /// Worker pool spec `<workers>[,<batch>]`. Bare flag: one worker per thread.
    #[arg(long, short = 'j', value_name = "SPEC", num_args = 0..=1, default_missing_value = "auto", value_parser = parse_parallelism)]
    pub jobs: Option<Parallelism>,

    /// Follow symbolic links while scanning.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Verbose output with a progress counter.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

impl Cli {
    /// The argument set shared by both subcommands.
    pub fn common(&self) -> &CommonArgs {
        match &self.command {
            Commands::Update(c) | Commands::Verify(c) => c,
        }
    }
}
