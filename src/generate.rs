//! Synthetic CSV generation.
//!
//! Every field is 1 to 32 characters drawn from `[A-Za-z0-9 ]`, always
//! wrapped in the quote character. Rows end in `\n`; there is no header.
//!
//! Rows are produced in fixed-size shards. Each shard gets its own RNG seeded
//! from the master RNG in shard order, so a given `seed` and `shard_rows`
//! always yield the same bytes, whether shards are rendered sequentially or
//! (feature `parallel-io`) in parallel with rayon.

use crate::io::compression::create_output;
#[cfg(feature = "metrics")]
use crate::metrics::RunMetrics;
use anyhow::{Context, Result, bail};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel-io")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::io::Write;
use std::path::Path;

/// Characters a generated field may contain.
pub const FIELD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789 ";
pub const MIN_FIELD_LEN: usize = 1;
pub const MAX_FIELD_LEN: usize = 32;

const DEFAULT_SHARD_ROWS: usize = 16_384;

/// Options for [`generate_csv`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenOptions {
    pub rows: usize,
    pub cols: usize,
    /// Field separator, `,` by default.
    pub delimiter: u8,
    /// Quote wrapped around every field, `'` by default.
    pub quote: u8,
    /// Fixed RNG seed for reproducible output. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Rows rendered per shard.
    pub shard_rows: usize,
}

impl GenOptions {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            delimiter: b',',
            quote: b'\'',
            seed: None,
            shard_rows: DEFAULT_SHARD_ROWS,
        }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub const fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub const fn with_shard_rows(mut self, shard_rows: usize) -> Self {
        self.shard_rows = shard_rows;
        self
    }

    /// Check that the options describe a writable CSV layout.
    ///
    /// # Errors
    /// Returns an error if `cols` is zero, the delimiter or quote is not a
    /// printable ASCII character, the quote belongs to [`FIELD_ALPHABET`], or
    /// both are the same character.
    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 {
            bail!("col_num must be at least 1");
        }
        for (what, b) in [("delimiter", self.delimiter), ("quote", self.quote)] {
            if !(b.is_ascii_graphic() || b == b' ' || b == b'\t') {
                bail!("{what} must be a printable ASCII character, got byte 0x{b:02x}");
            }
        }
        // The writer would double it wherever it appears inside a field.
        if FIELD_ALPHABET.contains(&self.quote) {
            bail!(
                "quote {:?} can occur inside generated fields; use a character outside [A-Za-z0-9 ]",
                char::from(self.quote)
            );
        }
        if self.delimiter == self.quote {
            bail!(
                "delimiter and quote must differ (both are {:?})",
                char::from(self.delimiter)
            );
        }
        Ok(())
    }
}

impl Default for GenOptions {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

/// One random field value (unquoted).
pub fn random_field<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(MIN_FIELD_LEN..=MAX_FIELD_LEN);
    (0..len)
        .map(|_| char::from(FIELD_ALPHABET[rng.gen_range(0..FIELD_ALPHABET.len())]))
        .collect()
}

/// Write `opts.rows` random rows to `path`, returning the number written.
///
/// The output is compressed when the extension asks for it.
///
/// # Errors
/// Returns an error if the options are invalid or the file cannot be written.
pub fn generate_csv(path: impl AsRef<Path>, opts: &GenOptions) -> Result<usize> {
    let path = path.as_ref();
    opts.validate()?;

    let mut master = match opts.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let shards: Vec<Shard> = split_rows(opts.rows, opts.shard_rows)
        .into_iter()
        .map(|(idx, start, end)| Shard {
            idx,
            rows: end - start,
            seed: master.r#gen(),
        })
        .collect();

    tracing::debug!(
        path = %path.display(),
        rows = opts.rows,
        cols = opts.cols,
        shards = shards.len(),
        "generating csv"
    );

    let mut out = create_output(path)?;
    for wave in shards.chunks(wave_size()) {
        for buf in render_wave(wave, opts)? {
            out.write_all(&buf)
                .with_context(|| format!("write {}", path.display()))?;
        }
    }
    out.finish()?;

    tracing::info!(path = %path.display(), rows = opts.rows, cols = opts.cols, "generation complete");
    Ok(opts.rows)
}

/// Like [`generate_csv`], also recording the timing and output size.
///
/// # Errors
/// See [`generate_csv`].
#[cfg(feature = "metrics")]
pub fn generate_csv_with_metrics(
    path: impl AsRef<Path>,
    opts: &GenOptions,
    metrics: &mut RunMetrics,
) -> Result<usize> {
    let path = path.as_ref();
    metrics.record_start();
    let rows = metrics.phase("generate", || generate_csv(path, opts))?;
    metrics.set_counter("rows", rows as u64);
    metrics.set_counter("cols", opts.cols as u64);
    let on_disk = std::fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    metrics.set_counter("output_file_bytes", on_disk);
    metrics.record_end();
    Ok(rows)
}

#[derive(Clone, Copy, Debug)]
struct Shard {
    idx: usize,
    rows: usize,
    seed: u64,
}

#[cfg(feature = "parallel-io")]
fn wave_size() -> usize {
    2 * num_cpus::get().max(2)
}

#[cfg(not(feature = "parallel-io"))]
fn wave_size() -> usize {
    1
}

#[cfg(feature = "parallel-io")]
fn render_wave(wave: &[Shard], opts: &GenOptions) -> Result<Vec<Vec<u8>>> {
    // Indexed parallel collect keeps shard order.
    wave.to_vec()
        .into_par_iter()
        .map(|shard| render_shard(shard, opts))
        .collect()
}

#[cfg(not(feature = "parallel-io"))]
fn render_wave(wave: &[Shard], opts: &GenOptions) -> Result<Vec<Vec<u8>>> {
    wave.iter().map(|&shard| render_shard(shard, opts)).collect()
}

fn render_shard(shard: Shard, opts: &GenOptions) -> Result<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(shard.seed);
    let row_hint = opts.cols.saturating_mul(20);
    let mut buf: Vec<u8> = Vec::with_capacity(shard.rows.saturating_mul(row_hint));
    {
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .delimiter(opts.delimiter)
            .quote(opts.quote)
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut buf);
        let mut record: Vec<String> = Vec::with_capacity(opts.cols);
        for i in 0..shard.rows {
            record.clear();
            record.extend((0..opts.cols).map(|_| random_field(&mut rng)));
            wtr.write_record(&record)
                .with_context(|| format!("render row {} of shard #{}", i + 1, shard.idx))?;
        }
        wtr.flush()?;
    }
    Ok(buf)
}

/// Split `[0, len)` into consecutive `(shard_idx, start, end)` ranges of at
/// most `per_shard` rows. Ranges are non-empty and cover the whole domain.
fn split_rows(len: usize, per_shard: usize) -> Vec<(usize, usize, usize)> {
    let per_shard = per_shard.max(1);
    (0..len.div_ceil(per_shard))
        .map(|idx| {
            let start = idx * per_shard;
            (idx, start, (start + per_shard).min(len))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_rows_covers_domain() {
        assert!(split_rows(0, 10).is_empty());
        assert_eq!(split_rows(5, 10), vec![(0, 0, 5)]);
        assert_eq!(split_rows(10, 4), vec![(0, 0, 4), (1, 4, 8), (2, 8, 10)]);
        assert_eq!(split_rows(3, 0), vec![(0, 0, 1), (1, 1, 2), (2, 2, 3)]);
    }

    #[test]
    fn random_field_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..2_000 {
            let f = random_field(&mut rng);
            assert!((MIN_FIELD_LEN..=MAX_FIELD_LEN).contains(&f.len()));
            assert!(f.bytes().all(|b| FIELD_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn validate_rejects_bad_layouts() {
        assert!(GenOptions::new(1, 0).validate().is_err());
        assert!(GenOptions::new(1, 1).with_quote(b',').validate().is_err());
        assert!(GenOptions::new(1, 1).with_delimiter(b'\n').validate().is_err());
        assert!(GenOptions::new(1, 1).with_delimiter(b'|').with_quote(b'"').validate().is_ok());
    }

    #[test]
    fn quote_from_the_field_alphabet_is_rejected() {
        for q in [b'a', b'Z', b'7', b' '] {
            let err = GenOptions::new(1, 1).with_quote(q).validate().unwrap_err();
            assert!(err.to_string().contains("inside generated fields"), "{err}");
        }
        // A letter delimiter is harmless: every field is quoted.
        assert!(GenOptions::new(1, 1).with_delimiter(b'x').validate().is_ok());
    }

    #[test]
    fn shard_render_is_quoted_and_delimited() -> Result<()> {
        let opts = GenOptions::new(3, 4).with_delimiter(b'|').with_quote(b'"');
        let buf = render_shard(Shard { idx: 0, rows: 3, seed: 9 }, &opts)?;
        let text = String::from_utf8(buf)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            let fields: Vec<&str> = line.split('|').collect();
            assert_eq!(fields.len(), 4);
            assert!(fields.iter().all(|f| f.len() >= 3 && f.starts_with('"') && f.ends_with('"')));
        }
        Ok(())
    }
}
