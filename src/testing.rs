//! Testing utilities for code that produces or shuffles delimited files.
//!
//! - **Fixtures**: temporary files and directories that clean themselves up,
//!   plus line readers that split exactly the way the shuffle core does
//! - **Assertions**: multiset comparison and a one-call check that an output
//!   is a header-preserving shuffle of its input
//!
//! # Quick Start
//!
//! ```no_run
//! use csvshuf::testing::*;
//! use csvshuf::{shuffle_file, ShuffleOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let input = TempFilePath::with_lines(&numbered_lines(10))?;
//! let dir = TempDirPath::new()?;
//! let out = dir.file_path("out.csv");
//!
//! shuffle_file(input.path(), &out, &ShuffleOptions::default())?;
//! assert_header_preserving_shuffle(&read_lines(input.path())?, &read_lines(&out)?);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
