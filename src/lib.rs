//! # csvshuf
//!
//! Two utilities for delimited text files:
//!
//! - **Shuffle** the data rows of an arbitrarily large file uniformly at
//!   random while keeping the header row first.
//! - **Generate** synthetic CSV with a chosen row/column count, delimiter and
//!   quote character.
//!
//! ## Shuffling large files
//!
//! The shuffle never holds row text for the whole file. It runs in three
//! phases:
//!
//! 1. [`RowIndex::build`] streams the input once and records the byte offset
//!    where each row starts (O(N) integers).
//! 2. [`Permutation::generate`] fixes index 0 and applies Fisher–Yates to
//!    indices `1..N`.
//! 3. [`write_permuted`] seeks to each row in permuted order, copies it to
//!    the output and terminates it with `\n`.
//!
//! Rows are opaque lines: fields, quotes and delimiters are never parsed.
//!
//! ```no_run
//! use csvshuf::{shuffle_file, ShuffleOptions};
//! # fn main() -> anyhow::Result<()> {
//! // Unseeded: different order every run.
//! shuffle_file("events.csv", "events.shuffled.csv", &ShuffleOptions::default())?;
//!
//! // Seeded: reproducible.
//! let report = shuffle_file("events.csv", "events.s42.csv", &ShuffleOptions::default().with_seed(42))?;
//! assert_eq!(report.seed, Some(42));
//! # Ok(())
//! # }
//! ```
//!
//! ## Generating data
//!
//! ```no_run
//! use csvshuf::{generate_csv, GenOptions};
//! # fn main() -> anyhow::Result<()> {
//! let opts = GenOptions::new(1_000, 5).with_delimiter(b';').with_quote(b'"');
//! generate_csv("synthetic.csv", &opts)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `compression-gzip`, `compression-zstd`, `compression-bzip2`,
//!   `compression-xz` - compress output files by extension
//! - `parallel-io` - render generator shards in parallel with rayon
//! - `metrics` - phase timings and counters ([`metrics::RunMetrics`])
//!
//! ## Module Overview
//!
//! - [`index`] - row counting and byte-offset indexing
//! - [`permutation`] - header-fixed uniform permutations
//! - [`writer`] - random-access row reads and permuted output
//! - [`shuffle`] - the end-to-end shuffle driver
//! - [`generate`] - synthetic CSV generation
//! - [`io`] - output compression
//! - [`cli`] - command-line definitions used by the `csvshuf` binary
//! - [`testing`] - fixtures and assertions for tests

pub mod cli;
pub mod generate;
pub mod index;
pub mod io;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod permutation;
pub mod shuffle;
pub mod testing;
pub mod writer;

pub use generate::{GenOptions, generate_csv};
pub use index::{RowIndex, count_rows};
pub use permutation::{Permutation, header_fixed_permutation};
pub use shuffle::{ShuffleOptions, ShuffleReport, shuffle_file};
pub use writer::{RowReader, WriteStats, write_permuted};

#[cfg(feature = "metrics")]
pub use generate::generate_csv_with_metrics;
#[cfg(feature = "metrics")]
pub use shuffle::shuffle_file_with_metrics;
