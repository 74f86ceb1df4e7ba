//! Header-preserving file shuffle: count → permute → write.
//!
//! ```no_run
//! use csvshuf::{shuffle_file, ShuffleOptions};
//! # fn main() -> anyhow::Result<()> {
//! let report = shuffle_file("big.csv", "big.shuffled.csv", &ShuffleOptions::default())?;
//! println!("wrote {} rows", report.rows);
//! # Ok(())
//! # }
//! ```
//!
//! # Design notes
//! - The input is read twice: once to build the [`RowIndex`], then once per
//!   row by seeking. Only offsets and indices are held in memory.
//! - The input must be a plain, seekable file. Compressed input is refused.
//! - The output may be compressed by extension (see [`crate::io::compression`]).

use crate::index::RowIndex;
#[cfg(feature = "metrics")]
use crate::metrics::RunMetrics;
use crate::io::compression::{create_output, sniff_input_codec};
use crate::permutation::Permutation;
use crate::writer::{RowReader, WriteStats, write_permuted};
use anyhow::{Result, bail};
use serde::Serialize;
use std::path::Path;

/// Runtime options for [`shuffle_file`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShuffleOptions {
    /// Fixed RNG seed for reproducible output. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl ShuffleOptions {
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Summary of a completed shuffle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShuffleReport {
    /// Rows written, header included. Always equal to the input row count.
    pub rows: usize,
    /// Uncompressed bytes written.
    pub bytes_written: u64,
    /// Seed used, when one was supplied.
    pub seed: Option<u64>,
}

/// Shuffle the data rows of `input` into `output`, keeping row 0 first.
///
/// # Errors
/// Returns an error if `input` cannot be read, is compressed, or is the same
/// file as `output`, or if `output` cannot be written. The output may be left
/// partially written.
pub fn shuffle_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    opts: &ShuffleOptions,
) -> Result<ShuffleReport> {
    let (input, output) = (input.as_ref(), output.as_ref());
    check_paths(input, output)?;

    let index = RowIndex::build(input)?;
    let order = permute(&index, opts);
    let stats = write_rows(index, &order, output)?;
    Ok(finish(input, output, opts, stats))
}

/// Like [`shuffle_file`], also recording phase timings and counters.
///
/// # Errors
/// See [`shuffle_file`].
#[cfg(feature = "metrics")]
pub fn shuffle_file_with_metrics(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    opts: &ShuffleOptions,
    metrics: &mut RunMetrics,
) -> Result<ShuffleReport> {
    let (input, output) = (input.as_ref(), output.as_ref());
    metrics.record_start();
    check_paths(input, output)?;

    let index = metrics.phase("index", || RowIndex::build(input))?;
    metrics.set_counter("input_bytes", index.file_len());
    let order = metrics.phase("permute", || Ok(permute(&index, opts)))?;
    let stats = metrics.phase("write", || write_rows(index, &order, output))?;
    metrics.set_counter("rows", stats.rows as u64);
    metrics.set_counter("output_bytes", stats.bytes);
    metrics.record_end();

    Ok(finish(input, output, opts, stats))
}

fn check_paths(input: &Path, output: &Path) -> Result<()> {
    if let Some(codec) = sniff_input_codec(input)? {
        bail!(
            "{} looks {codec}-compressed; shuffling needs a plain seekable file",
            input.display()
        );
    }
    if output.exists() && same_file(input, output)? {
        bail!(
            "refusing to shuffle {} onto itself; choose a different output path",
            input.display()
        );
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> Result<bool> {
    Ok(a.canonicalize()? == b.canonicalize()?)
}

fn permute(index: &RowIndex, opts: &ShuffleOptions) -> Permutation {
    let n = index.len();
    if n <= 2 {
        tracing::debug!(rows = n, "no data rows to reorder");
        return Permutation::identity(n);
    }
    tracing::debug!(rows = n, seeded = opts.seed.is_some(), "generating permutation");
    Permutation::generate(n, opts.seed)
}

fn write_rows(index: RowIndex, order: &Permutation, output: &Path) -> Result<WriteStats> {
    let mut reader = RowReader::open(index)?;
    let mut out = create_output(output)?;
    tracing::debug!(path = %output.display(), "writing shuffled rows");
    let stats = write_permuted(&mut reader, order, &mut out)?;
    out.finish()?;
    Ok(stats)
}

fn finish(input: &Path, output: &Path, opts: &ShuffleOptions, stats: WriteStats) -> ShuffleReport {
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        rows = stats.rows,
        bytes = stats.bytes,
        "shuffle complete"
    );
    ShuffleReport {
        rows: stats.rows,
        bytes_written: stats.bytes,
        seed: opts.seed,
    }
}
