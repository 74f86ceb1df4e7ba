//! File I/O shared by the shuffle writer and the generator.

pub mod compression;
