//! `csvshuf` command-line entry point.
//!
//! ```bash
//! csvshuf gen 1000000 8 data.csv --delimiter ';' --quote '"'
//! csvshuf shuffle data.csv data.shuffled.csv
//! ```
//!
//! Logs go to stderr. Set `RUST_LOG` to override `--quiet`/`-v`.

use clap::Parser;
use csvshuf::cli::{Cli, run};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("csvshuf={}", cli.log_level())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
