//! Temporary files and directories for tests.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// A temporary file that is deleted when dropped.
pub struct TempFilePath {
    #[allow(dead_code)]
    temp_file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// Create a new empty temporary file.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_file = NamedTempFile::new()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    /// Create a new empty temporary file with a specific extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn with_extension(extension: &str) -> std::io::Result<Self> {
        let temp_file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    /// Create a temporary file holding exactly `bytes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn with_contents(bytes: &[u8]) -> std::io::Result<Self> {
        let mut temp = Self::with_extension("csv")?;
        temp.temp_file.write_all(bytes)?;
        temp.temp_file.flush()?;
        Ok(temp)
    }

    /// Create a temporary file with one `\n`-terminated line per entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn with_lines<S: AsRef<str>>(lines: &[S]) -> std::io::Result<Self> {
        let mut body = String::new();
        for line in lines {
            body.push_str(line.as_ref());
            body.push('\n');
        }
        Self::with_contents(body.as_bytes())
    }

    /// Get the path to the temporary file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A temporary directory that is deleted, with its contents, when dropped.
pub struct TempDirPath {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// Create a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a file path within this directory.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }
}

/// Read a text file as lines, splitting on `\n` only.
///
/// A trailing newline does not produce an extra empty line, and `\r` is kept
/// as part of the line it ends.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not UTF-8.
pub fn read_lines(path: impl AsRef<Path>) -> std::io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(split_lines(&text))
}

/// Split `text` the same way [`read_lines`] does.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text.strip_suffix('\n').unwrap_or(text);
    body.split('\n').map(str::to_string).collect()
}

/// `n` distinct lines: a header `"id,value"` followed by `"{i},row-{i}"`.
#[must_use]
pub fn numbered_lines(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            if i == 0 {
                "id,value".to_string()
            } else {
                format!("{i},row-{i}")
            }
        })
        .collect()
}
