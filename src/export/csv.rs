//! CSV export

use std::path::Path;

use crate::error::Result;
use crate::model::Table;

use super::{Exporter, ExportOptions};

/// Writes delimited text with optional header and leading index column
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn export(&self, table: &Table, path: &Path, options: &ExportOptions) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().from_path(path)?;

        if options.header {
            let mut header = Vec::with_capacity(table.column_count() + 1);
            if options.index {
                // the index column has no name, as in the source convention
                header.push(String::new());
            }
            header.extend(table.columns.iter().map(|c| c.name.clone()));
            writer.write_record(&header)?;
        }

        for (pos, row) in table.rows.iter().enumerate() {
            let mut record = Vec::with_capacity(table.column_count() + 1);
            if options.index {
                record.push(pos.to_string());
            }
            record.extend(row.cells.iter().map(|c| c.render()));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext, "csv" | "tsv" | "txt")
    }
}
