//! Core data types and I/O operations.

pub mod loaders;
pub mod writers;

pub use loaders::{CoordinateRecord, LoaderError, ParsedFile, RowPolicy};
pub use writers::{write_counts_csv, write_filtered, WriteError};
