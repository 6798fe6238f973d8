//! Parquet file reader

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float32Array, Float64Array, Int16Array,
    Int32Array, Int64Array, Int8Array, StringArray, TimestampMicrosecondArray,
    TimestampMillisecondArray, TimestampNanosecondArray, TimestampSecondArray, UInt16Array,
    UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::{DataType as ArrowType, TimeUnit};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::model::{CellType, CellValue, Column, Table};

use super::Reader;

/// Reader for Parquet files
pub struct ParquetReader;

impl Reader for ParquetReader {
    fn read(&self, path: &Path) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .context("failed to create Parquet reader")?;
        let schema = builder.schema().clone();
        let reader = builder.build().context("failed to build Parquet reader")?;

        let columns: Vec<Column> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                Column::with_type(
                    field.name().clone(),
                    i,
                    arrow_type_to_cell_type(field.data_type()),
                )
            })
            .collect();

        let mut table = Table::new(columns);

        let mut line_num = 0usize;
        for batch_result in reader {
            let batch = batch_result.context("failed to read Parquet batch")?;
            for row_idx in 0..batch.num_rows() {
                line_num += 1;
                let cells: Vec<CellValue> = batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell_value(col, row_idx))
                    .collect();
                table.add_row(cells, line_num);
            }
        }

        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext, "parquet" | "pq")
    }
}

fn arrow_type_to_cell_type(arrow_type: &ArrowType) -> CellType {
    match arrow_type {
        ArrowType::Null => CellType::Null,
        ArrowType::Boolean => CellType::Bool,
        ArrowType::Int8
        | ArrowType::Int16
        | ArrowType::Int32
        | ArrowType::Int64
        | ArrowType::UInt8
        | ArrowType::UInt16
        | ArrowType::UInt32
        | ArrowType::UInt64 => CellType::Int,
        ArrowType::Float16 | ArrowType::Float32 | ArrowType::Float64 => CellType::Float,
        ArrowType::Utf8 | ArrowType::LargeUtf8 => CellType::String,
        ArrowType::Date32 | ArrowType::Date64 => CellType::Date,
        ArrowType::Timestamp(_, _) => CellType::DateTime,
        _ => CellType::String,
    }
}

fn extract_cell_value(array: &ArrayRef, row_idx: usize) -> CellValue {
    if array.is_null(row_idx) {
        return CellValue::Null;
    }

    macro_rules! int_value {
        ($ty:ty) => {{
            let arr = array.as_any().downcast_ref::<$ty>().unwrap();
            CellValue::Int(arr.value(row_idx) as i64)
        }};
    }

    match array.data_type() {
        ArrowType::Boolean => {
            let arr = array.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Bool(arr.value(row_idx))
        }
        ArrowType::Int8 => int_value!(Int8Array),
        ArrowType::Int16 => int_value!(Int16Array),
        ArrowType::Int32 => int_value!(Int32Array),
        ArrowType::Int64 => int_value!(Int64Array),
        ArrowType::UInt8 => int_value!(UInt8Array),
        ArrowType::UInt16 => int_value!(UInt16Array),
        ArrowType::UInt32 => int_value!(UInt32Array),
        ArrowType::UInt64 => int_value!(UInt64Array),
        ArrowType::Float32 => {
            let arr = array.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row_idx) as f64)
        }
        ArrowType::Float64 => {
            let arr = array.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row_idx))
        }
        ArrowType::Utf8 => {
            let arr = array.as_any().downcast_ref::<StringArray>().unwrap();
            CellValue::String(arr.value(row_idx).to_string())
        }
        ArrowType::Date32 => {
            let arr = array.as_any().downcast_ref::<Date32Array>().unwrap();
            let days = arr.value(row_idx);
            match chrono::NaiveDate::from_num_days_from_ce_opt(days + 719_163) {
                Some(date) => CellValue::Date(date),
                None => CellValue::Int(days as i64),
            }
        }
        ArrowType::Timestamp(unit, _) => {
            let nanos = match unit {
                TimeUnit::Second => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampSecondArray>()
                        .unwrap();
                    arr.value(row_idx) * 1_000_000_000
                }
                TimeUnit::Millisecond => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampMillisecondArray>()
                        .unwrap();
                    arr.value(row_idx) * 1_000_000
                }
                TimeUnit::Microsecond => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampMicrosecondArray>()
                        .unwrap();
                    arr.value(row_idx) * 1_000
                }
                TimeUnit::Nanosecond => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampNanosecondArray>()
                        .unwrap();
                    arr.value(row_idx)
                }
            };
            CellValue::DateTime(chrono::DateTime::from_timestamp_nanos(nanos).naive_utc())
        }
        _ => {
            // complex types fall back to their display text
            let formatter = arrow::util::display::ArrayFormatter::try_new(
                array.as_ref(),
                &arrow::util::display::FormatOptions::default(),
            );
            match formatter {
                Ok(fmt) => CellValue::String(fmt.value(row_idx).to_string()),
                Err(_) => CellValue::Null,
            }
        }
    }
}
