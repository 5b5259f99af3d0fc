//! Cksumdb CLI: `update` records checksums, `verify` compares against them.

use clap::Parser;
use cksumdb::engine::{Cli, handle_run};
use cksumdb::error::{CksumError, ExitCode};
use std::time::Instant;

fn main() {
    let start_time = Instant::now();
    let cli = Cli::parse();
    match handle_run(&cli) {
        Ok(code) => {
            log::debug!("Total time: {:?}", start_time.elapsed());
            std::process::exit(code.as_i32());
        }
        Err(err) => {
            let code = err
                .downcast_ref::<CksumError>()
                .map_or(ExitCode::Failure, CksumError::exit_code);
            eprintln!("Error: {err:#}");
            std::process::exit(code.as_i32());
        }
    }
}
