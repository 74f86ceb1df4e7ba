//! Output compression selected by file extension.
//!
//! Both tools stream their output through [`create_output`], which wraps the
//! file in a compressor when the path ends in a known extension:
//!
//! - **Gzip** (`.gz`) via `flate2` (feature: `compression-gzip`)
//! - **Zstd** (`.zst`) via `zstd` (feature: `compression-zstd`)
//! - **Bzip2** (`.bz2`) via `bzip2` (feature: `compression-bzip2`)
//! - **Xz** (`.xz`) via `xz2` (feature: `compression-xz`)
//!
//! Compressed streams cannot be seeked, so shuffle *input* is never
//! decompressed; [`sniff_input_codec`] exists to reject it early instead.
//!
//! Encoders only write their trailer when finished, so callers must end with
//! [`OutputFile::finish`]; dropping an [`OutputFile`] loses the trailer's
//! error, if any.
//!
//! ```no_run
//! use csvshuf::io::compression::create_output;
//! use std::io::Write;
//! # fn main() -> anyhow::Result<()> {
//! let mut out = create_output("rows.csv.zst")?;
//! out.write_all(b"'a','b'\n")?;
//! out.finish()?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::fs::{File, create_dir_all};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const WRITE_BUFFER_BYTES: usize = 64 * 1024;
const SNIFF_BYTES: usize = 10;

/// A compression format that can wrap an output stream.
pub trait CompressionCodec: Send + Sync {
    /// Human-readable codec name (e.g., "gzip", "zstd").
    fn name(&self) -> &'static str;

    /// Lowercase file extensions with the leading dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Signature at the start of a compressed stream.
    fn magic_bytes(&self) -> &'static [u8];

    /// Whether `head`, the first bytes of a file, look like this codec's stream.
    fn matches_head(&self, head: &[u8]) -> bool {
        head.starts_with(self.magic_bytes())
    }

    /// Wrap a file so that everything written to it is compressed.
    fn wrap_file(&self, file: File) -> io::Result<Box<dyn FinishWrite>>;
}

/// A writer whose stream needs an explicit end, such as a compressor trailer.
pub trait FinishWrite: Write {
    /// Write any pending trailer and flush it to the underlying file.
    ///
    /// # Errors
    /// Returns the I/O error raised while writing the trailer.
    fn finish_stream(self: Box<Self>) -> io::Result<()>;
}

impl FinishWrite for File {
    fn finish_stream(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}

fn builtin_codecs() -> Vec<Box<dyn CompressionCodec>> {
    vec![
        #[cfg(feature = "compression-gzip")]
        Box::new(GzipCodec),
        #[cfg(feature = "compression-zstd")]
        Box::new(ZstdCodec),
        #[cfg(feature = "compression-bzip2")]
        Box::new(Bzip2Codec),
        #[cfg(feature = "compression-xz")]
        Box::new(XzCodec),
    ]
}

/// Find the codec whose extension matches `path`, case-insensitively.
#[must_use]
pub fn codec_for_path(path: impl AsRef<Path>) -> Option<Box<dyn CompressionCodec>> {
    let name = path.as_ref().to_string_lossy().to_lowercase();
    builtin_codecs()
        .into_iter()
        .find(|c| c.extensions().iter().any(|ext| name.ends_with(ext)))
}

/// Name of the codec an existing file appears to be compressed with.
///
/// Checks the extension first, then the leading magic bytes. Returns
/// `Ok(None)` for plain files.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn sniff_input_codec(path: impl AsRef<Path>) -> Result<Option<&'static str>> {
    let path = path.as_ref();
    if let Some(codec) = codec_for_path(path) {
        return Ok(Some(codec.name()));
    }

    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut head = [0u8; SNIFF_BYTES];
    let mut filled = 0;
    while filled < head.len() {
        let n = f
            .read(&mut head[filled..])
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    let head = &head[..filled];

    Ok(builtin_codecs()
        .into_iter()
        .find(|c| c.matches_head(head))
        .map(|c| c.name()))
}

/// Buffered output file, compressed when its extension asks for it.
pub struct OutputFile {
    path: PathBuf,
    inner: BufWriter<Box<dyn FinishWrite>>,
}

impl OutputFile {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered bytes, then end the compressed stream.
    ///
    /// # Errors
    /// Returns an error if flushing or writing the stream trailer fails.
    pub fn finish(self) -> Result<()> {
        let path = self.path;
        let inner = self
            .inner
            .into_inner()
            .map_err(io::IntoInnerError::into_error)
            .with_context(|| format!("flush {}", path.display()))?;
        inner
            .finish_stream()
            .with_context(|| format!("finish {}", path.display()))
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Create (or truncate) `path` for writing, creating parent directories and
/// applying compression when the extension asks for it.
///
/// # Errors
/// Returns an error if directories or the file cannot be created.
pub fn create_output(path: impl AsRef<Path>) -> Result<OutputFile> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;

    let sink: Box<dyn FinishWrite> = match codec_for_path(path) {
        Some(codec) => {
            tracing::debug!(path = %path.display(), codec = codec.name(), "compressing output");
            codec
                .wrap_file(f)
                .with_context(|| format!("wrap writer with {} codec", codec.name()))?
        }
        None => Box::new(f),
    };
    Ok(OutputFile {
        path: path.to_path_buf(),
        inner: BufWriter::with_capacity(WRITE_BUFFER_BYTES, sink),
    })
}

// ============================================================================
// Built-in codecs
// ============================================================================

#[cfg(feature = "compression-gzip")]
use flate2::write::GzEncoder;

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> &'static [u8] {
        &[0x1f, 0x8b]
    }

    fn wrap_file(&self, file: File) -> io::Result<Box<dyn FinishWrite>> {
        use flate2::Compression;
        Ok(Box::new(GzEncoder::new(file, Compression::default())))
    }
}

#[cfg(feature = "compression-gzip")]
impl FinishWrite for GzEncoder<File> {
    fn finish_stream(self: Box<Self>) -> io::Result<()> {
        (*self).finish()?.flush()
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".zst", ".zstd"]
    }

    fn magic_bytes(&self) -> &'static [u8] {
        &[0x28, 0xb5, 0x2f, 0xfd]
    }

    fn wrap_file(&self, file: File) -> io::Result<Box<dyn FinishWrite>> {
        Ok(Box::new(zstd::stream::write::Encoder::new(file, 3)?))
    }
}

#[cfg(feature = "compression-zstd")]
impl FinishWrite for zstd::stream::write::Encoder<'static, File> {
    fn finish_stream(self: Box<Self>) -> io::Result<()> {
        (*self).finish()?.flush()
    }
}

#[cfg(feature = "compression-bzip2")]
use bzip2::write::BzEncoder;

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &'static str {
        "bzip2"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".bz2", ".bzip2"]
    }

    fn magic_bytes(&self) -> &'static [u8] {
        b"BZh"
    }

    // "BZh" is plausible text, so also require the block size digit and the
    // first block (or end-of-stream) marker.
    fn matches_head(&self, head: &[u8]) -> bool {
        const BLOCK_MAGIC: [u8; 6] = [0x31, 0x41, 0x59, 0x26, 0x53, 0x59];
        const EOS_MAGIC: [u8; 6] = [0x17, 0x72, 0x45, 0x38, 0x50, 0x90];
        match head {
            [b'B', b'Z', b'h', level, marker @ ..] if (b'1'..=b'9').contains(level) => {
                marker.starts_with(&BLOCK_MAGIC) || marker.starts_with(&EOS_MAGIC)
            }
            _ => false,
        }
    }

    fn wrap_file(&self, file: File) -> io::Result<Box<dyn FinishWrite>> {
        use bzip2::Compression;
        Ok(Box::new(BzEncoder::new(file, Compression::default())))
    }
}

#[cfg(feature = "compression-bzip2")]
impl FinishWrite for BzEncoder<File> {
    fn finish_stream(self: Box<Self>) -> io::Result<()> {
        (*self).finish()?.flush()
    }
}

#[cfg(feature = "compression-xz")]
use xz2::write::XzEncoder;

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl CompressionCodec for XzCodec {
    fn name(&self) -> &'static str {
        "xz"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".xz"]
    }

    fn magic_bytes(&self) -> &'static [u8] {
        &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]
    }

    fn wrap_file(&self, file: File) -> io::Result<Box<dyn FinishWrite>> {
        Ok(Box::new(XzEncoder::new(file, 6)))
    }
}

#[cfg(feature = "compression-xz")]
impl FinishWrite for XzEncoder<File> {
    fn finish_stream(self: Box<Self>) -> io::Result<()> {
        (*self).finish()?.flush()
    }
}
