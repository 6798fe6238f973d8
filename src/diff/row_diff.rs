//! Outer-join row matching on the composite key

use rustc_hash::FxHashSet;

use crate::model::{Row, Table};

/// Provenance of a matched row pair
pub enum RowMatch<'a> {
    /// Key present only in the old snapshot
    OldOnly(&'a Row),
    /// Key present only in the new snapshot
    NewOnly(&'a Row),
    /// Key present in both
    Both(&'a Row, &'a Row),
}

/// Full outer join of two keyed tables, hash-based.
///
/// Old-side rows come out in old order, then unmatched new-side rows in new
/// order. Both tables must already have their key columns designated.
pub fn match_rows<'a>(old: &'a Table, new: &'a Table) -> Vec<RowMatch<'a>> {
    let mut matches = Vec::with_capacity(old.row_count() + new.row_count());
    let mut matched_new_hashes = FxHashSet::default();

    for old_row in &old.rows {
        match new.get_row_by_hash(old_row.key_hash) {
            // Verify the key string; the hash alone can collide
            Some(new_row) if old_row.key == new_row.key => {
                matched_new_hashes.insert(new_row.key_hash);
                matches.push(RowMatch::Both(old_row, new_row));
            }
            _ => matches.push(RowMatch::OldOnly(old_row)),
        }
    }

    for new_row in &new.rows {
        if !matched_new_hashes.contains(&new_row.key_hash) {
            matches.push(RowMatch::NewOnly(new_row));
        }
    }

    matches
}
