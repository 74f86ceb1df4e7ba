//! Random-access row retrieval and permuted output.
//!
//! [`RowReader`] pairs an open handle on the original input with its
//! [`RowIndex`], so fetching row `i` is one seek plus one bounded copy
//! regardless of the order rows are requested in. [`write_permuted`] drives it over a
//! [`Permutation`].

use crate::index::RowIndex;
use crate::permutation::Permutation;
use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Seekable reader over the rows of an indexed file.
pub struct RowReader {
    file: File,
    index: RowIndex,
}

impl RowReader {
    /// Open the file the index was built from.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open(index: RowIndex) -> Result<Self> {
        let file = File::open(index.path())
            .with_context(|| format!("open {}", index.path().display()))?;
        Ok(Self { file, index })
    }

    /// Open `path` and index it in one step.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(RowIndex::build(path)?)
    }

    #[must_use]
    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Read row `row` into `buf` (cleared first), without its `\n` terminator.
    ///
    /// A `\r` before the `\n` is part of the row and is kept.
    ///
    /// # Errors
    /// Returns an error if `row` is out of range or the read fails, including
    /// when the file was truncated after indexing.
    pub fn read_row(&mut self, row: usize, buf: &mut Vec<u8>) -> Result<()> {
        buf.clear();
        self.copy_row(row, buf)?;
        Ok(())
    }

    /// Stream row `row`, without its `\n` terminator, into `out`.
    ///
    /// Only a fixed-size copy buffer is held, however long the row is.
    /// Returns the number of bytes copied.
    ///
    /// # Errors
    /// Returns an error if `row` is out of range, the read or write fails, or
    /// the file ends before the indexed row does.
    pub fn copy_row<W: Write + ?Sized>(&mut self, row: usize, out: &mut W) -> Result<u64> {
        let Some(span) = self.index.content_span(row) else {
            bail!("row {row} out of range (file has {} rows)", self.index.len());
        };
        let len = span.end - span.start;

        self.file
            .seek(SeekFrom::Start(span.start))
            .with_context(|| format!("seek to row {row} in {}", self.index.path().display()))?;
        let copied = io::copy(&mut (&self.file).take(len), out)
            .with_context(|| format!("copy row {row} from {}", self.index.path().display()))?;
        if copied != len {
            bail!(
                "{} ended inside row {row} ({copied} of {len} bytes); was it modified after indexing?",
                self.index.path().display()
            );
        }
        Ok(copied)
    }
}

/// Counters returned by [`write_permuted`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub rows: usize,
    pub bytes: u64,
}

/// Write the rows of `reader` to `out` in `order`, each followed by `\n`.
///
/// The writer is flushed before returning.
///
/// # Errors
/// Returns an error if the permutation length does not match the row count,
/// or if any read or write fails.
pub fn write_permuted<W: Write + ?Sized>(
    reader: &mut RowReader,
    order: &Permutation,
    out: &mut W,
) -> Result<WriteStats> {
    if order.len() != reader.len() {
        bail!(
            "permutation covers {} rows but {} has {}",
            order.len(),
            reader.index().path().display(),
            reader.len()
        );
    }

    let mut stats = WriteStats::default();
    for (pos, i) in order.iter().enumerate() {
        let len = reader.copy_row(i, out)?;
        out.write_all(b"\n")
            .with_context(|| format!("write output row #{}", pos + 1))?;
        stats.rows += 1;
        stats.bytes += len + 1;
    }
    out.flush().context("flush output")?;
    Ok(stats)
}
