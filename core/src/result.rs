//! Diff results, warnings, and fatal errors.
//!
//! This module defines what a comparison produces:
//! - [`DiffResult`]: the immutable output consumed by rendering and export
//! - [`ChangedRow`]: one matched-changed row with its per-column verdicts
//! - [`AmbiguousKeyWarning`]: non-fatal duplicate-key diagnostics
//! - [`DiffError`]: the fatal errors that abort a comparison

use crate::compare::CellVerdict;
use crate::error_codes;
use crate::key::Side;
use crate::table::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a comparison; no partial result is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DiffError {
    #[error(
        "[TBLDIFF_DIFF_001] column sets differ: missing from candidate: [{}]; missing from base: [{}]. Suggestion: compare files exported from the same template.",
        missing_in_candidate.join(", "),
        missing_in_base.join(", ")
    )]
    SchemaMismatch {
        /// Columns present in base but absent from candidate, in base order.
        missing_in_candidate: Vec<String>,
        /// Columns present in candidate but absent from base, in candidate order.
        missing_in_base: Vec<String>,
    },

    #[error(
        "[TBLDIFF_DIFF_002] key column '{column}' not found in the {side} table. Suggestion: check the column name and casing, or omit the key to compare by row position."
    )]
    KeyNotFound { column: String, side: Side },
}

impl DiffError {
    pub fn code(&self) -> &'static str {
        match self {
            DiffError::SchemaMismatch { .. } => error_codes::DIFF_SCHEMA_MISMATCH,
            DiffError::KeyNotFound { .. } => error_codes::DIFF_KEY_NOT_FOUND,
        }
    }
}

/// Duplicate key values were found in one input; the comparison proceeded
/// using the last occurrence of each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguousKeyWarning {
    pub side: Side,
    pub key: String,
    pub occurrences: usize,
}

impl std::fmt::Display for AmbiguousKeyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ambiguous key '{}' in the {} table ({} occurrences); using the last one",
            self.key, self.side, self.occurrences
        )
    }
}

/// A row present in both tables with at least one differing cell.
///
/// `cells` is parallel to the result's `columns` and covers every column;
/// unchanged columns carry their value so renderers can show full rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedRow {
    /// Canonical key string identifying the record.
    pub key: String,
    /// Row index within the candidate table.
    pub row: usize,
    pub cells: Vec<CellVerdict>,
}

impl ChangedRow {
    pub fn is_changed(&self, col: usize) -> bool {
        self.cells.get(col).is_some_and(CellVerdict::is_changed)
    }
}

/// The immutable outcome of one comparison.
///
/// All row collections use `columns` (the candidate table's column order):
/// new and changed rows come from the candidate verbatim, and missing rows
/// are projected from the base into that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub columns: Vec<String>,
    /// Key column name, or `None` when identity was positional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_column: Option<String>,
    /// Rows present only in the candidate, in candidate row order.
    pub new_rows: Vec<Vec<Option<Value>>>,
    /// Rows present only in the base, in base row order.
    pub missing_rows: Vec<Vec<Option<Value>>>,
    /// Matched rows with at least one changed cell, in candidate row order.
    pub changed_rows: Vec<ChangedRow>,
    /// Matched rows with no changed cell; counted, never materialized.
    pub unchanged_count: usize,
    /// True when the inputs were row-for-row identical and the comparison
    /// short-circuited.
    pub identical: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AmbiguousKeyWarning>,
}

impl DiffResult {
    /// True when no difference of any classification was found.
    pub fn is_empty(&self) -> bool {
        self.new_rows.is_empty() && self.missing_rows.is_empty() && self.changed_rows.is_empty()
    }

    /// The stable highlight predicate over the changed-rows table: rendering
    /// and export both consult it, so they always flag the same cells.
    pub fn is_changed(&self, row: usize, col: usize) -> bool {
        self.changed_rows
            .get(row)
            .is_some_and(|r| r.is_changed(col))
    }

    /// Display form of a changed-rows cell, with the `*` marker appended to
    /// changed cells.
    pub fn marked_value(&self, row: usize, col: usize) -> String {
        let Some(changed_row) = self.changed_rows.get(row) else {
            return String::new();
        };
        let Some(verdict) = changed_row.cells.get(col) else {
            return String::new();
        };
        let rendered = format_value(verdict.candidate_value());
        if verdict.is_changed() {
            format!("{rendered}*")
        } else {
            rendered
        }
    }
}

/// Display form of a cell value; absent cells render as the empty string.
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::Text(s)) => s.clone(),
        Some(v) => v.canonical_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed_row() -> ChangedRow {
        ChangedRow {
            key: "2".to_string(),
            row: 1,
            cells: vec![
                CellVerdict::Unchanged {
                    value: Some(Value::Number(2.0)),
                },
                CellVerdict::Changed {
                    from: Some(Value::Number(25.0)),
                    to: Some(Value::Number(26.0)),
                },
            ],
        }
    }

    fn result() -> DiffResult {
        DiffResult {
            columns: vec!["ID".into(), "Edad".into()],
            key_column: Some("ID".into()),
            new_rows: Vec::new(),
            missing_rows: Vec::new(),
            changed_rows: vec![changed_row()],
            unchanged_count: 1,
            identical: false,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn highlight_predicate_flags_only_changed_cells() {
        let r = result();
        assert!(!r.is_changed(0, 0));
        assert!(r.is_changed(0, 1));
        assert!(!r.is_changed(0, 2), "out-of-range column is not flagged");
        assert!(!r.is_changed(1, 0), "out-of-range row is not flagged");
    }

    #[test]
    fn marked_value_appends_asterisk_to_changed_cells() {
        let r = result();
        assert_eq!(r.marked_value(0, 0), "2");
        assert_eq!(r.marked_value(0, 1), "26*");
    }

    #[test]
    fn format_value_preserves_text_verbatim() {
        assert_eq!(format_value(Some(&Value::Text(" Juan ".into()))), " Juan ");
        assert_eq!(format_value(Some(&Value::Number(40.0))), "40");
        assert_eq!(format_value(None), "");
    }

    #[test]
    fn serde_roundtrip_preserves_result() {
        let r = result();
        let json = serde_json::to_string(&r).expect("serialize result");
        let parsed: DiffResult = serde_json::from_str(&json).expect("deserialize result");
        assert_eq!(r, parsed);
    }

    #[test]
    fn schema_mismatch_message_names_both_sides() {
        let err = DiffError::SchemaMismatch {
            missing_in_candidate: vec!["Edad".into()],
            missing_in_base: vec![],
        };
        let message = err.to_string();
        assert!(message.contains("Edad"));
        assert!(message.contains(err.code()));
    }
}
