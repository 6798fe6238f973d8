//! Error taxonomy for tabsql operations

use crate::connect::Backend;

/// Errors surfaced by the differ, connection builder, and export dispatcher
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Diff inputs do not expose the same column set
    #[error("snapshots must have the same columns: old has [{old}], new has [{new}]")]
    SchemaMismatch { old: String, new: String },

    /// A requested key column is not present in the table
    #[error("key column '{0}' not found")]
    KeyColumnMissing(String),

    /// A key tuple occurs more than once within a single input
    #[error("duplicate key '{key}' in {side} snapshot")]
    DuplicateKey { key: String, side: &'static str },

    /// Every candidate driver for the backend failed to open
    #[error("could not connect to {backend} database: tried drivers {attempted:?}")]
    ConnectionFailure {
        backend: Backend,
        attempted: Vec<String>,
    },

    /// Export path extension is not a recognized format
    #[error("unsupported export format '{0}': expected .csv or .parquet")]
    UnsupportedFormat(String),

    #[error("failed to write CSV")]
    Csv(#[from] csv::Error),

    #[error("failed to write Parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow conversion failed")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
