//! Row counting and byte-offset indexing.
//!
//! A *row* is any run of bytes terminated by `\n` or by end-of-file. Both entry
//! points stream the file through a buffered reader and never keep row
//! contents in memory:
//!
//! - [`count_rows`] only counts terminators.
//! - [`RowIndex::build`] additionally records where every row starts, which is
//!   what lets the shuffle writer seek straight to row `i`.
//!
//! # Examples
//! ```no_run
//! use csvshuf::index::{count_rows, RowIndex};
//! # fn main() -> anyhow::Result<()> {
//! let n = count_rows("data.csv")?;
//! let index = RowIndex::build("data.csv")?;
//! assert_eq!(n, index.len());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Range;
use std::path::{Path, PathBuf};

const READ_BUFFER_BYTES: usize = 64 * 1024;

/// Count the rows of a text file without retaining their contents.
///
/// An empty file has 0 rows; `"a\n"` has 1; `"a\nb"` has 2.
///
/// # Errors
/// Returns an error if the file cannot be opened or read. The underlying
/// [`std::io::Error`] is kept in the chain.
pub fn count_rows(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut rdr = BufReader::with_capacity(READ_BUFFER_BYTES, f);

    let mut rows = 0usize;
    let mut open_row = false;
    loop {
        let buf = rdr
            .fill_buf()
            .with_context(|| format!("read {}", path.display()))?;
        if buf.is_empty() {
            break;
        }
        let newlines = buf.iter().filter(|&&b| b == b'\n').count();
        rows += newlines;
        open_row = buf.last() != Some(&b'\n');
        let consumed = buf.len();
        rdr.consume(consumed);
    }
    if open_row {
        rows += 1;
    }
    Ok(rows)
}

/// Byte offsets of every row in a file.
///
/// Holds `len() + 1` offsets: row `i` spans `offsets[i]..offsets[i + 1]`,
/// terminator included, and the last entry is the file length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowIndex {
    path: PathBuf,
    offsets: Vec<u64>,
    // Final row ends at EOF without a `\n`.
    open_tail: bool,
}

impl RowIndex {
    /// Scan `path` once and record the start offset of each row.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub fn build(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let f = File::open(&path).with_context(|| format!("open {}", path.display()))?;
        let mut rdr = BufReader::with_capacity(READ_BUFFER_BYTES, f);

        let mut offsets = vec![0u64];
        let mut pos = 0u64;
        loop {
            let buf = rdr
                .fill_buf()
                .with_context(|| format!("read {}", path.display()))?;
            if buf.is_empty() {
                break;
            }
            for (i, &b) in buf.iter().enumerate() {
                if b == b'\n' {
                    offsets.push(pos + i as u64 + 1);
                }
            }
            pos += buf.len() as u64;
            let consumed = buf.len();
            rdr.consume(consumed);
        }

        let open_tail = offsets.last() != Some(&pos);
        if open_tail {
            tracing::warn!(path = %path.display(), "last row has no trailing newline");
            offsets.push(pos);
        }

        tracing::debug!(path = %path.display(), rows = offsets.len() - 1, bytes = pos, "built row index");
        Ok(Self {
            path,
            offsets,
            open_tail,
        })
    }

    /// Path the index was built from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte range of row `row`, terminator included. `None` when out of range.
    #[must_use]
    pub fn span(&self, row: usize) -> Option<Range<u64>> {
        let start = *self.offsets.get(row)?;
        let end = *self.offsets.get(row + 1)?;
        Some(start..end)
    }

    /// Byte range of row `row` without its `\n` terminator. A `\r` before the
    /// terminator stays inside the range.
    #[must_use]
    pub fn content_span(&self, row: usize) -> Option<Range<u64>> {
        let span = self.span(row)?;
        let terminated = row + 1 < self.len() || !self.open_tail;
        let end = if terminated { span.end - 1 } else { span.end };
        Some(span.start..end)
    }

    /// Total size of the indexed file in bytes.
    #[must_use]
    pub fn file_len(&self) -> u64 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Length in bytes of the longest row, terminator included.
    #[must_use]
    pub fn max_row_len(&self) -> u64 {
        self.offsets
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0)
    }
}
