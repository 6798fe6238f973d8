//! In-memory relation model: tables of named, typed columns

mod schema;
mod table;

pub use schema::{CellType, Column};
pub use table::{CellValue, Row, Table};
