//! Command-line interface definitions and dispatch.
//!
//! ```text
//! csvshuf gen <row_num> <col_num> <output_file> [-d D] [-q Q] [--seed S] [--shard-rows K]
//! csvshuf shuffle <input_file> <output_file> [--seed S]
//! ```
//!
//! Any other first argument is reported as an unknown tool.

use crate::generate::GenOptions;
#[cfg(not(feature = "metrics"))]
use crate::generate::generate_csv;
#[cfg(feature = "metrics")]
use crate::generate::generate_csv_with_metrics;
#[cfg(feature = "metrics")]
use crate::metrics::RunMetrics;
use crate::shuffle::ShuffleOptions;
#[cfg(not(feature = "metrics"))]
use crate::shuffle::shuffle_file;
#[cfg(feature = "metrics")]
use crate::shuffle::shuffle_file_with_metrics;
use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "csvshuf")]
#[command(about = "Generate random CSV files and shuffle CSV rows while keeping the header first")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Save run metrics as JSON to this file
    #[cfg(feature = "metrics")]
    #[arg(long, global = true, value_name = "FILE")]
    pub metrics: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// The available tools.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a CSV file of random quoted alphanumeric fields
    Gen(GenArgs),
    /// Shuffle the data rows of a CSV file, keeping the header first
    Shuffle(ShuffleArgs),
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

#[derive(Debug, Args)]
pub struct GenArgs {
    /// Number of rows to write
    pub row_num: usize,

    /// Number of fields per row
    pub col_num: usize,

    /// Output file (.gz/.zst/.bz2/.xz compress)
    pub output_file: PathBuf,

    /// Field delimiter
    #[arg(short = 'd', long, default_value = ",", value_parser = parse_ascii_byte)]
    pub delimiter: u8,

    /// Quote character wrapped around every field
    #[arg(short = 'q', long, default_value = "'", value_parser = parse_ascii_byte)]
    pub quote: u8,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Rows rendered per parallel shard
    #[arg(long, value_name = "ROWS")]
    pub shard_rows: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ShuffleArgs {
    /// File to shuffle (plain, uncompressed)
    pub input_file: PathBuf,

    /// Where to write the shuffled copy
    pub output_file: PathBuf,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    /// Log filter directive implied by `--quiet` / `-v`.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

impl GenArgs {
    #[must_use]
    pub fn to_options(&self) -> GenOptions {
        let mut opts = GenOptions::new(self.row_num, self.col_num)
            .with_delimiter(self.delimiter)
            .with_quote(self.quote);
        if let Some(seed) = self.seed {
            opts = opts.with_seed(seed);
        }
        if let Some(rows) = self.shard_rows {
            opts = opts.with_shard_rows(rows);
        }
        opts
    }
}

impl ShuffleArgs {
    #[must_use]
    pub fn to_options(&self) -> ShuffleOptions {
        ShuffleOptions { seed: self.seed }
    }
}

fn parse_ascii_byte(s: &str) -> std::result::Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("expected a single ASCII character, got {s:?}")),
    }
}

/// Run the selected tool.
///
/// # Errors
/// Returns an error for an unknown tool or when the tool itself fails.
pub fn run(cli: &Cli) -> Result<()> {
    #[cfg(feature = "metrics")]
    let mut metrics = RunMetrics::new(tool_name(&cli.command));

    match &cli.command {
        Command::Gen(args) => {
            #[cfg(feature = "metrics")]
            generate_csv_with_metrics(&args.output_file, &args.to_options(), &mut metrics)?;
            #[cfg(not(feature = "metrics"))]
            generate_csv(&args.output_file, &args.to_options())?;
        }
        Command::Shuffle(args) => {
            #[cfg(feature = "metrics")]
            let report = shuffle_file_with_metrics(
                &args.input_file,
                &args.output_file,
                &args.to_options(),
                &mut metrics,
            )?;
            #[cfg(not(feature = "metrics"))]
            let report = shuffle_file(&args.input_file, &args.output_file, &args.to_options())?;
            tracing::debug!(report = %serde_json::to_string(&report)?, "shuffle report");
        }
        Command::Unknown(argv) => {
            let name = argv.first().map_or("", String::as_str);
            bail!("unknown tool: {name} (expected `gen` or `shuffle`)");
        }
    }

    #[cfg(feature = "metrics")]
    {
        if cli.verbose > 0 {
            metrics.print();
        }
        if let Some(path) = &cli.metrics {
            metrics.save_to_file(path)?;
            tracing::debug!(path = %path.display(), "saved metrics");
        }
    }
    Ok(())
}

#[cfg(feature = "metrics")]
fn tool_name(command: &Command) -> &'static str {
    match command {
        Command::Gen(_) => "gen",
        Command::Shuffle(_) => "shuffle",
        Command::Unknown(_) => "unknown",
    }
}
