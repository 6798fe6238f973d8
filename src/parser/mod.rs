//! Readers that materialize relations from tabular files

mod csv;
mod parquet;

use std::path::Path;

use anyhow::{bail, Result};

use crate::model::Table;

pub use self::csv::CsvReader;
pub use self::parquet::ParquetReader;

/// Trait for reading a tabular file into a [`Table`]
pub trait Reader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Table>;

    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory selecting a reader by file extension
pub struct ReaderFactory {
    readers: Vec<Box<dyn Reader>>,
}

impl Default for ReaderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderFactory {
    pub fn new() -> Self {
        Self {
            readers: vec![Box::new(CsvReader), Box::new(ParquetReader)],
        }
    }

    pub fn get_reader(&self, path: &Path) -> Result<&dyn Reader> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        for reader in &self.readers {
            if reader.supports_extension(&ext) {
                return Ok(reader.as_ref());
            }
        }

        bail!("unsupported input format: {}", path.display())
    }

    pub fn read(&self, path: &Path) -> Result<Table> {
        self.get_reader(path)?.read(path)
    }
}
