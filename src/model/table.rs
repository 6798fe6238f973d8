//! Table, Row, and Cell data structures

use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use rustc_hash::{FxHashSet, FxHasher};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::schema::Column;

/// A cell value with type information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // NaN is identical to NaN for matching purposes
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64) == *b,
            (CellValue::Float(a), CellValue::Int(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Null => {}
            CellValue::Bool(b) => b.hash(state),
            CellValue::Int(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::String(s) => s.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::DateTime(dt) => dt.hash(state),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the cell, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Render for key building and CSV output; nulls render empty
    pub fn render(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Date(d) => d.to_string(),
            CellValue::DateTime(dt) => dt.to_string(),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => f.write_str("NULL"),
            other => f.write_str(&other.render()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in a table
#[derive(Debug, Clone)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
    /// Composite key string built from the key columns
    pub key: String,
    /// Pre-computed key hash for O(1) lookup
    pub key_hash: u64,
    /// 1-indexed line/row number in the source, 0 for synthesized rows
    pub source_line: usize,
}

impl Row {
    pub fn new(cells: Vec<CellValue>, key_column_indices: &[usize], source_line: usize) -> Self {
        let key = Self::compute_key(&cells, key_column_indices);
        let key_hash = Self::hash_key(&key);
        Self {
            cells,
            key,
            key_hash,
            source_line,
        }
    }

    /// Composite key from the designated columns, in key-column order
    fn compute_key(cells: &[CellValue], key_column_indices: &[usize]) -> String {
        key_column_indices
            .iter()
            .filter_map(|&i| cells.get(i))
            .map(CellValue::render)
            .collect::<Vec<_>>()
            .join("|")
    }

    fn hash_key(key: &str) -> u64 {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        hasher.finish()
    }

    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }

    pub(crate) fn recompute_key(&mut self, key_column_indices: &[usize]) {
        self.key = Self::compute_key(&self.cells, key_column_indices);
        self.key_hash = Self::hash_key(&self.key);
    }
}

/// An in-memory relation: ordered rows of named, typed columns
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// All rows, in source order
    pub rows: Vec<Row>,
    /// Indices of the designated key columns, in key order
    pub key_columns: Vec<usize>,
    /// Key hash to row index; later rows with the same key win
    pub row_index: IndexMap<u64, usize>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            key_columns: Vec::new(),
            row_index: IndexMap::new(),
        }
    }

    pub fn add_row(&mut self, cells: Vec<CellValue>, source_line: usize) {
        let row = Row::new(cells, &self.key_columns, source_line);
        let hash = row.key_hash;
        let idx = self.rows.len();
        self.rows.push(row);
        self.row_index.insert(hash, idx);
    }

    /// Designate key columns by name and re-key every row.
    ///
    /// Fails with [`Error::KeyColumnMissing`] if any name is absent.
    pub fn set_key_columns(&mut self, key_names: &[String]) -> Result<()> {
        let mut indices = Vec::with_capacity(key_names.len());
        for name in key_names {
            let idx = self
                .column_index(name)
                .ok_or_else(|| Error::KeyColumnMissing(name.clone()))?;
            indices.push(idx);
        }
        self.key_columns = indices;

        for row in &mut self.rows {
            row.recompute_key(&self.key_columns);
        }
        self.rebuild_row_index();
        Ok(())
    }

    fn rebuild_row_index(&mut self) {
        self.row_index.clear();
        for (idx, row) in self.rows.iter().enumerate() {
            self.row_index.insert(row.key_hash, idx);
        }
    }

    pub fn get_row_by_hash(&self, hash: u64) -> Option<&Row> {
        self.row_index.get(&hash).map(|&idx| &self.rows[idx])
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// First key string that occurs on more than one row, if any
    pub fn first_duplicate_key(&self) -> Option<&str> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for row in &self.rows {
            if !seen.insert(row.key.as_str()) {
                return Some(&row.key);
            }
        }
        None
    }

    /// New empty table keeping only the given columns, re-indexed from 0.
    /// Key columns are remapped where they survive the projection.
    pub fn project_columns(&self, indices: &[usize]) -> Table {
        let columns = indices
            .iter()
            .enumerate()
            .filter_map(|(new_idx, &old_idx)| {
                self.columns.get(old_idx).map(|c| {
                    Column::with_type(c.name.clone(), new_idx, c.inferred_type)
                })
            })
            .collect();
        let mut projected = Table::new(columns);
        projected.key_columns = self
            .key_columns
            .iter()
            .filter_map(|k| indices.iter().position(|i| i == k))
            .collect();
        projected
    }
}
