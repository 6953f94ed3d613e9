//! Row identity: key descriptors and the per-table key index.
//!
//! A [`KeyIndex`] maps canonical key strings to row indexes for one table.
//! Key values are coerced to a canonical string form before comparison so a
//! numeric `1` in one file matches a textual `"1"` in the other. Duplicate
//! key values are recoverable: the last occurrence wins and each duplicated
//! key is recorded so the engine can surface a warning.

use crate::result::DiffError;
use crate::table::{Table, Value};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;

/// How rows are identified across the two tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDescriptor {
    /// A named column whose canonicalized value identifies a record.
    Column(String),
    /// Zero-based row order stands in for identity.
    Positional,
}

impl KeyDescriptor {
    pub fn column(name: impl Into<String>) -> KeyDescriptor {
        KeyDescriptor::Column(name.into())
    }

    pub fn column_name(&self) -> Option<&str> {
        match self {
            KeyDescriptor::Column(name) => Some(name),
            KeyDescriptor::Positional => None,
        }
    }
}

/// Which input table a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Base,
    Candidate,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Base => write!(f, "base"),
            Side::Candidate => write!(f, "candidate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DuplicateKey {
    pub key: String,
    pub occurrences: usize,
}

/// Key value → row lookup for one table.
#[derive(Debug)]
pub(crate) struct KeyIndex {
    /// Index of the key column in the table, `None` in positional mode.
    pub key_col: Option<usize>,
    /// Keys in first-occurrence order; drives deterministic iteration.
    keys: Vec<String>,
    /// Key → (row index of last occurrence, occurrence count).
    map: FxHashMap<String, (usize, usize)>,
}

impl KeyIndex {
    pub fn build(table: &Table, key: &KeyDescriptor, side: Side) -> Result<KeyIndex, DiffError> {
        match key {
            KeyDescriptor::Column(name) => {
                let key_col =
                    table
                        .column_index(name)
                        .ok_or_else(|| DiffError::KeyNotFound {
                            column: name.clone(),
                            side,
                        })?;
                let mut keys = Vec::with_capacity(table.n_rows());
                let mut map: FxHashMap<String, (usize, usize)> = FxHashMap::default();
                for (row_idx, row) in table.rows().enumerate() {
                    let k = canonical_key(row[key_col].as_ref());
                    match map.entry(k) {
                        Entry::Occupied(mut entry) => {
                            // Last occurrence wins.
                            let (row, count) = entry.get_mut();
                            *row = row_idx;
                            *count += 1;
                        }
                        Entry::Vacant(entry) => {
                            keys.push(entry.key().clone());
                            entry.insert((row_idx, 1));
                        }
                    }
                }
                Ok(KeyIndex {
                    key_col: Some(key_col),
                    keys,
                    map,
                })
            }
            KeyDescriptor::Positional => {
                let mut keys = Vec::with_capacity(table.n_rows());
                let mut map = FxHashMap::default();
                for row_idx in 0..table.n_rows() {
                    let k = row_idx.to_string();
                    map.insert(k.clone(), (row_idx, 1));
                    keys.push(k);
                }
                Ok(KeyIndex {
                    key_col: None,
                    keys,
                    map,
                })
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn row(&self, key: &str) -> Option<usize> {
        self.map.get(key).map(|(row, _)| *row)
    }

    /// `(key, winning row)` pairs in first-occurrence order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, usize)> {
        self.keys
            .iter()
            .filter_map(|k| self.map.get(k).map(|(row, _)| (k.as_str(), *row)))
    }

    pub fn duplicates(&self) -> Vec<DuplicateKey> {
        self.keys
            .iter()
            .filter_map(|k| {
                let (_, count) = self.map.get(k)?;
                (*count > 1).then(|| DuplicateKey {
                    key: k.clone(),
                    occurrences: *count,
                })
            })
            .collect()
    }
}

/// Canonical string form of a key cell; absent keys canonicalize to the
/// empty string and participate in matching like any other value.
pub(crate) fn canonical_key(value: Option<&Value>) -> String {
    value.map(Value::canonical_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableBuilder;

    fn table(columns: &[&str], rows: &[&[Option<Value>]]) -> Table {
        let mut builder =
            TableBuilder::new(columns.iter().map(|c| c.to_string()).collect()).unwrap();
        for row in rows {
            builder.push_row(row.to_vec()).unwrap();
        }
        builder.finish()
    }

    fn num(n: f64) -> Option<Value> {
        Some(Value::Number(n))
    }

    fn text(s: &str) -> Option<Value> {
        Some(Value::Text(s.to_string()))
    }

    #[test]
    fn named_key_maps_canonical_values_to_rows() {
        let t = table(
            &["ID", "Nombre"],
            &[&[num(1.0), text("Juan")], &[text("2"), text("Ana")]],
        );
        let index = KeyIndex::build(&t, &KeyDescriptor::column("ID"), Side::Base).unwrap();
        assert_eq!(index.row("1"), Some(0));
        assert_eq!(index.row("2"), Some(1), "textual '2' canonicalizes like numeric 2");
        assert!(index.duplicates().is_empty());
    }

    #[test]
    fn missing_key_column_is_fatal() {
        let t = table(&["ID"], &[&[num(1.0)]]);
        let err = KeyIndex::build(&t, &KeyDescriptor::column("Codigo"), Side::Candidate)
            .expect_err("absent key column should fail");
        assert!(matches!(
            err,
            DiffError::KeyNotFound { ref column, side: Side::Candidate } if column == "Codigo"
        ));
    }

    #[test]
    fn duplicate_keys_keep_last_row_and_are_recorded() {
        let t = table(
            &["ID", "Edad"],
            &[
                &[num(1.0), num(30.0)],
                &[num(2.0), num(25.0)],
                &[num(1.0), num(31.0)],
            ],
        );
        let index = KeyIndex::build(&t, &KeyDescriptor::column("ID"), Side::Base).unwrap();
        assert_eq!(index.row("1"), Some(2), "last occurrence wins");
        let dups = index.duplicates();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].key, "1");
        assert_eq!(dups[0].occurrences, 2);
    }

    #[test]
    fn entries_preserve_first_occurrence_order() {
        let t = table(
            &["ID"],
            &[&[num(3.0)], &[num(1.0)], &[num(3.0)], &[num(2.0)]],
        );
        let index = KeyIndex::build(&t, &KeyDescriptor::column("ID"), Side::Base).unwrap();
        let keys: Vec<&str> = index.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["3", "1", "2"]);
        assert_eq!(index.row("3"), Some(2));
    }

    #[test]
    fn positional_index_uses_row_order() {
        let t = table(&["A"], &[&[num(10.0)], &[num(20.0)]]);
        let index = KeyIndex::build(&t, &KeyDescriptor::Positional, Side::Base).unwrap();
        assert_eq!(index.key_col, None);
        assert_eq!(index.row("0"), Some(0));
        assert_eq!(index.row("1"), Some(1));
        assert!(!index.contains("2"));
    }

    #[test]
    fn absent_key_values_canonicalize_to_empty_string() {
        let t = table(&["ID", "X"], &[&[None, num(1.0)], &[None, num(2.0)]]);
        let index = KeyIndex::build(&t, &KeyDescriptor::column("ID"), Side::Base).unwrap();
        assert_eq!(index.row(""), Some(1));
        assert_eq!(index.duplicates().len(), 1);
    }
}
