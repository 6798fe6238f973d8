//! Export dispatcher: saves a table to a format chosen by file extension

mod csv;
mod parquet;

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Table;

pub use self::csv::CsvExporter;
pub use self::parquet::ParquetExporter;

/// Formatting flags for export
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Write a leading column holding the 0-based row position (CSV only)
    pub index: bool,
    /// Write a header row (CSV only)
    pub header: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            index: true,
            header: true,
        }
    }
}

/// Trait for writing a table to disk in one format
pub trait Exporter: Send + Sync {
    fn export(&self, table: &Table, path: &Path, options: &ExportOptions) -> Result<()>;

    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory selecting an exporter by file extension
pub struct ExporterFactory {
    exporters: Vec<Box<dyn Exporter>>,
}

impl Default for ExporterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ExporterFactory {
    pub fn new() -> Self {
        Self {
            exporters: vec![Box::new(CsvExporter), Box::new(ParquetExporter)],
        }
    }

    /// Exporter for the given path; unrecognized extensions are fatal
    pub fn get_exporter(&self, path: &Path) -> Result<&dyn Exporter> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        self.exporters
            .iter()
            .find(|e| e.supports_extension(&ext))
            .map(|e| e.as_ref())
            .ok_or(Error::UnsupportedFormat(ext))
    }
}

/// Save a table to `path`, dispatching on the extension. Existing files are
/// overwritten.
pub fn save_table(table: &Table, path: &Path, options: &ExportOptions) -> Result<()> {
    let factory = ExporterFactory::new();
    let exporter = factory.get_exporter(path)?;
    log::debug!(
        "saving {} rows x {} columns to {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    exporter.export(table, path, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, Column};

    #[test]
    fn unknown_extension_is_rejected() {
        let table = Table::new(vec![Column::new("id", 0)]);
        let err = save_table(
            &table,
            Path::new("out.h5x"),
            &ExportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ext) if ext == "h5x"));
    }

    #[test]
    fn extension_is_case_insensitive() {
        let factory = ExporterFactory::new();
        assert!(factory.get_exporter(Path::new("OUT.CSV")).is_ok());
        assert!(factory.get_exporter(Path::new("out.Parquet")).is_ok());
        assert!(factory.get_exporter(Path::new("out")).is_err());
    }

    #[test]
    fn missing_extension_is_rejected() {
        let mut table = Table::new(vec![Column::new("id", 0)]);
        table.add_row(vec![CellValue::Int(1)], 1);
        let err = save_table(&table, Path::new("noext"), &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
