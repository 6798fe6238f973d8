//! Snapshot differ: partitions two keyed relations into changed, added,
//! and removed rows

pub mod cell_diff;
mod row_diff;

use serde::{Deserialize, Serialize};

use crate::config::DiffOptions;
use crate::error::{Error, Result};
use crate::model::Table;

pub use cell_diff::CellComparator;
pub use row_diff::{match_rows, RowMatch};

/// Counts from a snapshot comparison
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DiffStats {
    pub rows_added: usize,
    pub rows_removed: usize,
    pub rows_changed: usize,
    pub rows_unchanged: usize,
    pub old_row_count: usize,
    pub new_row_count: usize,
}

impl DiffStats {
    pub fn has_changes(&self) -> bool {
        self.rows_added > 0 || self.rows_removed > 0 || self.rows_changed > 0
    }
}

/// Result of comparing two snapshots.
///
/// A key appears in at most one of the three tables; rows whose non-key
/// values are equal on both sides appear in none of them.
#[derive(Debug)]
pub struct SnapshotDiff {
    /// Keys present in both snapshots whose non-key values differ,
    /// carrying the full new-side row
    pub changed: Table,
    /// Keys present only in the new snapshot, full rows
    pub added: Table,
    /// Keys present only in the old snapshot, key columns only
    pub removed: Table,
    pub stats: DiffStats,
}

impl SnapshotDiff {
    pub fn has_changes(&self) -> bool {
        self.stats.has_changes()
    }
}

/// Snapshot diff engine
pub struct DiffEngine {
    options: DiffOptions,
    comparator: CellComparator,
}

impl DiffEngine {
    pub fn new(options: DiffOptions) -> Self {
        let comparator = CellComparator::new(&options);
        Self {
            options,
            comparator,
        }
    }

    /// Compare `old` against `new`, matching rows on `key_columns`.
    ///
    /// Both snapshots must expose the same column-name set; column order is
    /// irrelevant. Fails without partial output on a schema mismatch, a
    /// missing key column, or (unless allowed) a duplicated key.
    pub fn diff(
        &self,
        old: &Table,
        new: &Table,
        key_columns: &[String],
    ) -> Result<SnapshotDiff> {
        check_schema(old, new)?;

        let mut old = old.clone();
        let mut new = new.clone();
        old.set_key_columns(key_columns)?;
        new.set_key_columns(key_columns)?;

        if !self.options.allow_duplicate_keys {
            if let Some(key) = old.first_duplicate_key() {
                return Err(Error::DuplicateKey {
                    key: key.to_string(),
                    side: "old",
                });
            }
            if let Some(key) = new.first_duplicate_key() {
                return Err(Error::DuplicateKey {
                    key: key.to_string(),
                    side: "new",
                });
            }
        }

        // Non-key column pairs, resolved by name so column order may differ
        let value_columns: Vec<(usize, usize)> = new
            .columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| !new.key_columns.contains(idx))
            .map(|(new_idx, col)| {
                let old_idx = old
                    .column_index(&col.name)
                    .expect("schema already checked");
                (old_idx, new_idx)
            })
            .collect();

        let mut changed = Table::new(new.columns.clone());
        changed.key_columns = new.key_columns.clone();
        let mut added = Table::new(new.columns.clone());
        added.key_columns = new.key_columns.clone();
        let mut removed = old.project_columns(&old.key_columns);

        let mut stats = DiffStats {
            old_row_count: old.row_count(),
            new_row_count: new.row_count(),
            ..DiffStats::default()
        };

        for m in match_rows(&old, &new) {
            match m {
                RowMatch::OldOnly(row) => {
                    let key_cells = old
                        .key_columns
                        .iter()
                        .filter_map(|&i| row.get(i).cloned())
                        .collect();
                    removed.add_row(key_cells, row.source_line);
                    stats.rows_removed += 1;
                }
                RowMatch::NewOnly(row) => {
                    added.add_row(row.cells.clone(), row.source_line);
                    stats.rows_added += 1;
                }
                RowMatch::Both(old_row, new_row) => {
                    let is_changed = value_columns.iter().any(|&(old_idx, new_idx)| {
                        match (old_row.get(old_idx), new_row.get(new_idx)) {
                            (Some(a), Some(b)) => self.comparator.differs(a, b),
                            _ => false,
                        }
                    });
                    if is_changed {
                        changed.add_row(new_row.cells.clone(), new_row.source_line);
                        stats.rows_changed += 1;
                    } else {
                        stats.rows_unchanged += 1;
                    }
                }
            }
        }

        Ok(SnapshotDiff {
            changed,
            added,
            removed,
            stats,
        })
    }
}

/// Compare two snapshots with the given options
pub fn diff_snapshots(
    old: &Table,
    new: &Table,
    key_columns: &[String],
    options: &DiffOptions,
) -> Result<SnapshotDiff> {
    DiffEngine::new(options.clone()).diff(old, new, key_columns)
}

fn check_schema(old: &Table, new: &Table) -> Result<()> {
    let mut old_names = old.column_names();
    let mut new_names = new.column_names();
    old_names.sort_unstable();
    new_names.sort_unstable();
    if old_names != new_names {
        return Err(Error::SchemaMismatch {
            old: old.column_names().join(", "),
            new: new.column_names().join(", "),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, Column};

    fn table(cols: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        let columns = cols
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(*name, i))
            .collect();
        let mut t = Table::new(columns);
        for (line, cells) in rows.into_iter().enumerate() {
            t.add_row(cells, line + 1);
        }
        t
    }

    fn id_val(rows: &[(i64, f64)]) -> Table {
        table(
            &["id", "val"],
            rows.iter()
                .map(|(id, val)| vec![CellValue::Int(*id), CellValue::Float(*val)])
                .collect(),
        )
    }

    fn key() -> Vec<String> {
        vec!["id".to_string()]
    }

    fn diff(old: &Table, new: &Table) -> SnapshotDiff {
        diff_snapshots(old, new, &key(), &DiffOptions::default()).unwrap()
    }

    #[test]
    fn identical_snapshots_yield_empty_result() {
        let t = id_val(&[(1, 10.0), (2, 20.0)]);
        let d = diff(&t, &t.clone());
        assert_eq!(d.changed.row_count(), 0);
        assert_eq!(d.added.row_count(), 0);
        assert_eq!(d.removed.row_count(), 0);
        assert!(!d.has_changes());
        assert_eq!(d.stats.rows_unchanged, 2);
    }

    #[test]
    fn disjoint_keys_split_into_added_and_removed() {
        let old = id_val(&[(1, 10.0), (2, 20.0)]);
        let new = id_val(&[(3, 30.0), (4, 40.0)]);
        let d = diff(&old, &new);
        assert_eq!(d.removed.row_count(), 2);
        assert_eq!(d.added.row_count(), 2);
        assert_eq!(d.changed.row_count(), 0);
        // removed carries key columns only
        assert_eq!(d.removed.column_names(), vec!["id"]);
        assert_eq!(d.removed.rows[0].cells, vec![CellValue::Int(1)]);
        // added carries the full new row
        assert_eq!(
            d.added.rows[0].cells,
            vec![CellValue::Int(3), CellValue::Float(30.0)]
        );
    }

    #[test]
    fn remove_and_add_scenario() {
        let old = id_val(&[(1, 10.0), (2, 20.0)]);
        let new = id_val(&[(1, 10.0), (3, 30.0)]);
        let d = diff(&old, &new);
        assert_eq!(d.removed.row_count(), 1);
        assert_eq!(d.removed.rows[0].cells, vec![CellValue::Int(2)]);
        assert_eq!(d.added.row_count(), 1);
        assert_eq!(
            d.added.rows[0].cells,
            vec![CellValue::Int(3), CellValue::Float(30.0)]
        );
        assert_eq!(d.changed.row_count(), 0);
    }

    #[test]
    fn changed_rows_carry_new_side_values() {
        let old = id_val(&[(1, 10.0)]);
        let new = id_val(&[(1, 11.0)]);
        let d = diff(&old, &new);
        assert_eq!(d.changed.row_count(), 1);
        assert_eq!(
            d.changed.rows[0].cells,
            vec![CellValue::Int(1), CellValue::Float(11.0)]
        );
        assert_eq!(d.added.row_count(), 0);
        assert_eq!(d.removed.row_count(), 0);
    }

    #[test]
    fn float_noise_within_tolerance_is_not_a_change() {
        let old = id_val(&[(1, 1.0)]);
        let new = id_val(&[(1, 1.000_000_1)]);
        let d = diff(&old, &new);
        assert_eq!(d.changed.row_count(), 0);
        assert_eq!(d.stats.rows_unchanged, 1);

        let new = id_val(&[(1, 1.1)]);
        let d = diff(&old, &new);
        assert_eq!(d.changed.row_count(), 1);
    }

    #[test]
    fn key_column_change_is_remove_plus_add() {
        let old = id_val(&[(1, 10.0)]);
        let new = id_val(&[(2, 10.0)]);
        let d = diff(&old, &new);
        assert_eq!(d.removed.row_count(), 1);
        assert_eq!(d.added.row_count(), 1);
        assert_eq!(d.changed.row_count(), 0);
    }

    #[test]
    fn null_transitions() {
        let old = table(
            &["id", "val"],
            vec![
                vec![CellValue::Int(1), CellValue::Null],
                vec![CellValue::Int(2), CellValue::Null],
            ],
        );
        let new = table(
            &["id", "val"],
            vec![
                vec![CellValue::Int(1), CellValue::Null],
                vec![CellValue::Int(2), CellValue::Float(5.0)],
            ],
        );
        let d = diff(&old, &new);
        // null -> null is not a change; null -> concrete is
        assert_eq!(d.changed.row_count(), 1);
        assert_eq!(d.changed.rows[0].key, "2");
    }

    #[test]
    fn schema_mismatch_is_fatal() {
        let old = id_val(&[(1, 10.0)]);
        let new = table(
            &["id", "other"],
            vec![vec![CellValue::Int(1), CellValue::Float(10.0)]],
        );
        let err = diff_snapshots(&old, &new, &key(), &DiffOptions::default()).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn column_order_is_insignificant() {
        let old = id_val(&[(1, 10.0)]);
        let new = table(
            &["val", "id"],
            vec![vec![CellValue::Float(11.0), CellValue::Int(1)]],
        );
        let d = diff(&old, &new);
        assert_eq!(d.changed.row_count(), 1);
        assert_eq!(d.changed.rows[0].key, "1");
    }

    #[test]
    fn duplicate_keys_rejected_by_default() {
        let old = id_val(&[(1, 10.0), (1, 11.0)]);
        let new = id_val(&[(1, 10.0)]);
        let err = diff_snapshots(&old, &new, &key(), &DiffOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { side: "old", .. }));

        let opts = DiffOptions::default().with_allow_duplicate_keys(true);
        assert!(diff_snapshots(&old, &new, &key(), &opts).is_ok());
    }

    #[test]
    fn composite_keys() {
        let old = table(
            &["a", "b", "val"],
            vec![vec![
                CellValue::Int(1),
                CellValue::from("x"),
                CellValue::Float(1.0),
            ]],
        );
        let new = table(
            &["a", "b", "val"],
            vec![vec![
                CellValue::Int(1),
                CellValue::from("y"),
                CellValue::Float(1.0),
            ]],
        );
        let keys = vec!["a".to_string(), "b".to_string()];
        let d = diff_snapshots(&old, &new, &keys, &DiffOptions::default()).unwrap();
        assert_eq!(d.removed.row_count(), 1);
        assert_eq!(d.removed.column_names(), vec!["a", "b"]);
        assert_eq!(d.added.row_count(), 1);
    }

    #[test]
    fn missing_key_column_is_fatal() {
        let old = id_val(&[(1, 10.0)]);
        let new = id_val(&[(1, 10.0)]);
        let keys = vec!["pk".to_string()];
        let err = diff_snapshots(&old, &new, &keys, &DiffOptions::default()).unwrap_err();
        assert!(matches!(err, Error::KeyColumnMissing(_)));
    }
}
