//! In-memory representation of one loaded dataset.
//!
//! This module defines the core intermediate representation shared by the
//! ingestion paths and the diff engine:
//! - [`Value`]: a scalar cell value; a cell is `Option<Value>` where `None`
//!   means the value is absent
//! - [`ColumnType`]: the semantic type tag inferred for a column at load time
//! - [`Table`]: an immutable rectangular dataset with ordered, unique,
//!   named columns
//! - [`TableBuilder`]: the only way to construct a [`Table`]; enforces the
//!   rectangularity and column-name invariants

use crate::hashing::normalize_float_for_hash;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// A scalar cell value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                normalize_float_for_hash(*a) == normalize_float_for_hash(*b)
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Number(n) => {
                0u8.hash(state);
                normalize_float_for_hash(*n).hash(state);
            }
            Value::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
            Value::Bool(b) => {
                2u8.hash(state);
                b.hash(state);
            }
        }
    }
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        if let Value::Number(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(s) = self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// The numeric reading of this value, if it has one.
    ///
    /// Numbers are returned as-is; text is trimmed and parsed. Booleans have
    /// no numeric reading.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(_) => None,
        }
    }

    /// The canonical string form used for key matching and normalized text
    /// comparison: integral finite numbers render without a fractional part
    /// (so `1` and `"1"` coerce to the same key), text is trimmed, booleans
    /// render `true`/`false`.
    pub fn canonical_string(&self) -> String {
        match self {
            Value::Number(n) => canonical_number(*n),
            Value::Text(s) => s.trim().to_string(),
            Value::Bool(b) => b.to_string(),
        }
    }
}

fn canonical_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Semantic type tag of a column, fixed at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Every non-absent value is a number or parses as one.
    Numeric,
    /// Every non-absent value is textual.
    Text,
    /// Mixed or non-scalar content; compared textually.
    Other,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Text => "text",
            ColumnType::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Errors raised while assembling a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TableError {
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },
    #[error("column {index} has an empty name")]
    EmptyColumnName { index: usize },
    #[error("row {row} has {got} cells, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },
}

/// An immutable rectangular dataset.
///
/// # Invariants
///
/// Column names are unique and non-empty; every row has exactly
/// `columns().len()` cells; `types()` is parallel to `columns()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    types: Vec<ColumnType>,
    rows: Vec<Vec<Option<Value>>>,
}

impl Table {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn types(&self) -> &[ColumnType] {
        &self.types
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_type(&self, index: usize) -> ColumnType {
        self.types[index]
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> &[Option<Value>] {
        &self.rows[index]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<Value>]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows[row][col].as_ref()
    }
}

/// Incrementally builds a [`Table`], enforcing its invariants; column types
/// are inferred from the accumulated values when `finish` is called.
#[derive(Debug)]
pub struct TableBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Value>>>,
}

impl TableBuilder {
    pub fn new(columns: Vec<String>) -> Result<TableBuilder, TableError> {
        for (index, name) in columns.iter().enumerate() {
            if name.is_empty() {
                return Err(TableError::EmptyColumnName { index });
            }
            if columns[..index].iter().any(|c| c == name) {
                return Err(TableError::DuplicateColumn { name: name.clone() });
            }
        }
        Ok(TableBuilder {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn push_row(&mut self, cells: Vec<Option<Value>>) -> Result<(), TableError> {
        if cells.len() != self.columns.len() {
            return Err(TableError::RowWidthMismatch {
                row: self.rows.len(),
                expected: self.columns.len(),
                got: cells.len(),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    pub fn finish(self) -> Table {
        let types = infer_column_types(&self.columns, &self.rows);
        Table {
            columns: self.columns,
            types,
            rows: self.rows,
        }
    }
}

fn infer_column_types(columns: &[String], rows: &[Vec<Option<Value>>]) -> Vec<ColumnType> {
    (0..columns.len())
        .map(|col| {
            let mut saw_value = false;
            let mut all_numeric = true;
            let mut all_text = true;
            for row in rows {
                let Some(value) = &row[col] else { continue };
                saw_value = true;
                if value.to_number().is_none() {
                    all_numeric = false;
                }
                if !matches!(value, Value::Text(_)) {
                    all_text = false;
                }
            }
            if !saw_value {
                ColumnType::Other
            } else if all_numeric {
                ColumnType::Numeric
            } else if all_text {
                ColumnType::Text
            } else {
                ColumnType::Other
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<Value> {
        Some(Value::Text(s.to_string()))
    }

    fn num(n: f64) -> Option<Value> {
        Some(Value::Number(n))
    }

    #[test]
    fn builder_rejects_duplicate_columns() {
        let err = TableBuilder::new(vec!["ID".into(), "ID".into()])
            .expect_err("duplicate column names should be rejected");
        assert_eq!(err, TableError::DuplicateColumn { name: "ID".into() });
    }

    #[test]
    fn builder_rejects_empty_column_name() {
        let err = TableBuilder::new(vec!["ID".into(), "".into()])
            .expect_err("empty column names should be rejected");
        assert_eq!(err, TableError::EmptyColumnName { index: 1 });
    }

    #[test]
    fn builder_rejects_ragged_rows() {
        let mut builder = TableBuilder::new(vec!["A".into(), "B".into()]).unwrap();
        builder.push_row(vec![num(1.0), num(2.0)]).unwrap();
        let err = builder
            .push_row(vec![num(3.0)])
            .expect_err("short rows should be rejected");
        assert_eq!(
            err,
            TableError::RowWidthMismatch {
                row: 1,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn infers_numeric_from_numbers_and_numeric_text() {
        let mut builder = TableBuilder::new(vec!["N".into()]).unwrap();
        builder.push_row(vec![num(1.0)]).unwrap();
        builder.push_row(vec![text(" 2.5 ")]).unwrap();
        builder.push_row(vec![None]).unwrap();
        let table = builder.finish();
        assert_eq!(table.column_type(0), ColumnType::Numeric);
    }

    #[test]
    fn infers_text_when_any_value_is_non_numeric_text() {
        let mut builder = TableBuilder::new(vec!["T".into()]).unwrap();
        builder.push_row(vec![text("1")]).unwrap();
        builder.push_row(vec![text("Juan")]).unwrap();
        let table = builder.finish();
        assert_eq!(table.column_type(0), ColumnType::Text);
    }

    #[test]
    fn infers_other_for_mixed_and_empty_columns() {
        let mut builder = TableBuilder::new(vec!["M".into(), "E".into()]).unwrap();
        builder
            .push_row(vec![Some(Value::Bool(true)), None])
            .unwrap();
        builder.push_row(vec![text("yes"), None]).unwrap();
        let table = builder.finish();
        assert_eq!(table.column_type(0), ColumnType::Other);
        assert_eq!(table.column_type(1), ColumnType::Other);
    }

    #[test]
    fn canonical_string_coerces_integral_numbers() {
        assert_eq!(Value::Number(1.0).canonical_string(), "1");
        assert_eq!(Value::Number(25.5).canonical_string(), "25.5");
        assert_eq!(Value::Text(" 1 ".into()).canonical_string(), "1");
        assert_eq!(Value::Bool(true).canonical_string(), "true");
        assert_eq!(Value::Number(f64::NAN).canonical_string(), "NaN");
    }

    #[test]
    fn number_equality_ignores_ulp_drift_and_zero_sign() {
        assert_eq!(Value::Number(0.0), Value::Number(-0.0));
        assert_eq!(
            Value::Number(1.0),
            Value::Number(1.000_000_000_000_000_2)
        );
        assert_ne!(Value::Number(1.0), Value::Number(1.0001));
    }

    #[test]
    fn cross_type_values_never_equal() {
        assert_ne!(Value::Number(1.0), Value::Text("1".into()));
        assert_ne!(Value::Bool(true), Value::Text("true".into()));
    }
}
