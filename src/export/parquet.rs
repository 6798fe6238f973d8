//! Parquet export: the binary columnar container format
//!
//! One table per file, overwritten on every save.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Date32Builder, Float64Builder, Int64Builder, StringBuilder,
    TimestampMicrosecondBuilder,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::Datelike;
use parquet::arrow::ArrowWriter;

use crate::error::Result;
use crate::model::{CellType, CellValue, Table};

use super::{Exporter, ExportOptions};

// Days from 0001-01-01 (CE) to the 1970-01-01 epoch
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Writes a table as a single-batch Parquet file
pub struct ParquetExporter;

impl Exporter for ParquetExporter {
    fn export(&self, table: &Table, path: &Path, options: &ExportOptions) -> Result<()> {
        // index/header flags only apply to delimited text
        let _ = options;

        let fields: Vec<Field> = table
            .columns
            .iter()
            .map(|c| Field::new(&c.name, cell_type_to_arrow(c.inferred_type), true))
            .collect();
        let schema = Arc::new(Schema::new(fields));

        let arrays: Vec<ArrayRef> = table
            .columns
            .iter()
            .map(|c| build_column(table, c.index, c.inferred_type))
            .collect();

        let batch = RecordBatch::try_new(schema.clone(), arrays)?;

        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext, "parquet" | "pq")
    }
}

fn cell_type_to_arrow(cell_type: CellType) -> DataType {
    match cell_type {
        CellType::Bool => DataType::Boolean,
        CellType::Int => DataType::Int64,
        CellType::Float => DataType::Float64,
        CellType::Date => DataType::Date32,
        CellType::DateTime => DataType::Timestamp(TimeUnit::Microsecond, None),
        // all-null, string, and mixed columns round-trip as text
        CellType::Null | CellType::String | CellType::Mixed => DataType::Utf8,
    }
}

fn build_column(table: &Table, col_idx: usize, cell_type: CellType) -> ArrayRef {
    let cells = table.rows.iter().map(|r| r.get(col_idx));
    match cell_type {
        CellType::Bool => {
            let mut b = BooleanBuilder::with_capacity(table.row_count());
            for cell in cells {
                b.append_option(match cell {
                    Some(CellValue::Bool(v)) => Some(*v),
                    _ => None,
                });
            }
            Arc::new(b.finish())
        }
        CellType::Int => {
            let mut b = Int64Builder::with_capacity(table.row_count());
            for cell in cells {
                b.append_option(match cell {
                    Some(CellValue::Int(v)) => Some(*v),
                    _ => None,
                });
            }
            Arc::new(b.finish())
        }
        CellType::Float => {
            let mut b = Float64Builder::with_capacity(table.row_count());
            for cell in cells {
                b.append_option(cell.and_then(CellValue::as_f64));
            }
            Arc::new(b.finish())
        }
        CellType::Date => {
            let mut b = Date32Builder::with_capacity(table.row_count());
            for cell in cells {
                b.append_option(match cell {
                    Some(CellValue::Date(d)) => Some(d.num_days_from_ce() - EPOCH_DAYS_FROM_CE),
                    _ => None,
                });
            }
            Arc::new(b.finish())
        }
        CellType::DateTime => {
            let mut b = TimestampMicrosecondBuilder::with_capacity(table.row_count());
            for cell in cells {
                b.append_option(match cell {
                    Some(CellValue::DateTime(dt)) => Some(dt.and_utc().timestamp_micros()),
                    _ => None,
                });
            }
            Arc::new(b.finish())
        }
        CellType::Null | CellType::String | CellType::Mixed => {
            let mut b = StringBuilder::new();
            for cell in cells {
                match cell {
                    Some(CellValue::Null) | None => b.append_null(),
                    Some(v) => b.append_value(v.render()),
                }
            }
            Arc::new(b.finish())
        }
    }
}
