//! Category → index encoding tables.
//!
//! Tables are learned once from the training distribution: the distinct
//! stringified values of a column, sorted, with the position as the index.
//! Lookups at prediction time collapse rare categories first and then fall
//! back to index 0 for anything unseen — a deterministic policy, never an
//! error.

use crate::data::{FieldValue, Record};
use std::collections::{BTreeMap, BTreeSet};

/// Learn one table per column over the full training set. Values are
/// stringified with [`FieldValue::to_category`] and sorted so index
/// assignment is stable across runs.
pub fn fit_tables(rows: &[Record], columns: &[&str]) -> BTreeMap<String, Vec<String>> {
    let mut tables = BTreeMap::new();
    for &col in columns {
        let mut distinct = BTreeSet::new();
        for row in rows {
            if let Some(v) = row.get(col) {
                distinct.insert(v.to_category());
            }
        }
        tables.insert(col.to_string(), distinct.into_iter().collect());
    }
    tables
}

/// Replace every categorical cell with its learned index. Training rows are
/// in-vocabulary by construction, but the fallback still applies.
pub fn apply_tables(rows: &mut [Record], tables: &BTreeMap<String, Vec<String>>) {
    for row in rows.iter_mut() {
        for (col, classes) in tables {
            if let Some(v) = row.get(col) {
                let idx = lookup(classes, &v.to_category());
                row.insert(col.clone(), FieldValue::Number(idx as f64));
            }
        }
    }
}

/// Index of `value` in the table; an unseen value maps to the index-0
/// category. This exact fallback is a serving-compatibility contract.
pub fn lookup(classes: &[String], value: &str) -> usize {
    classes.iter().position(|c| c == value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_of(values: &[&str]) -> Vec<Record> {
        values
            .iter()
            .map(|v| {
                let mut r = Record::new();
                r.insert("gender".to_string(), FieldValue::Text(v.to_string()));
                r
            })
            .collect()
    }

    #[test]
    fn tables_are_sorted_and_deduplicated() {
        let rows = rows_of(&["M", "F", "M", "Other"]);
        let tables = fit_tables(&rows, &["gender"]);
        assert_eq!(tables["gender"], vec!["F", "M", "Other"]);
    }

    #[test]
    fn unseen_value_falls_back_to_index_zero() {
        let classes = vec!["F".to_string(), "M".to_string()];
        assert_eq!(lookup(&classes, "M"), 1);
        assert_eq!(lookup(&classes, "X"), 0);
        assert_eq!(lookup(&classes, ""), 0);
    }

    #[test]
    fn apply_replaces_cells_with_indices() {
        let mut rows = rows_of(&["M", "F"]);
        let tables = fit_tables(&rows, &["gender"]);
        apply_tables(&mut rows, &tables);
        assert_eq!(rows[0]["gender"], FieldValue::Number(1.0));
        assert_eq!(rows[1]["gender"], FieldValue::Number(0.0));
    }
}
