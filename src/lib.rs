//! tabsql - tabular snapshot utilities for SQL workflows
//!
//! Three pieces: a row-level diff between two keyed tabular snapshots, a
//! database connection builder with ordered driver fallback, and an
//! extension-dispatched export of a table to CSV or Parquet.

pub mod config;
pub mod connect;
pub mod diff;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;

pub use config::DiffOptions;
pub use connect::{create_connection, Backend, ConnectParams, Connection};
pub use diff::{diff_snapshots, SnapshotDiff};
pub use error::{Error, Result};
pub use export::{save_table, ExportOptions};
pub use model::Table;
