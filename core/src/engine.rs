//! The diff engine: row classification and per-cell change attribution.
//!
//! [`diff_tables`] classifies every row of both tables as matched-unchanged,
//! matched-changed, new, or missing, and attaches a full per-column verdict
//! vector to each changed row. The engine never mutates its inputs and owns
//! only the transient key indexes built for a single call.

use crate::compare::{CellVerdict, compare_cells};
use crate::config::DiffConfig;
use crate::hashing::row_fingerprint;
use crate::key::{KeyDescriptor, KeyIndex, Side};
use crate::result::{AmbiguousKeyWarning, ChangedRow, DiffError, DiffResult};
use crate::table::{ColumnType, Table, Value};

/// Compare `base` against `candidate` under the given row identity.
///
/// Fails with [`DiffError::SchemaMismatch`] when the column sets differ
/// (order-independent) and with [`DiffError::KeyNotFound`] when a named key
/// column is absent from either table. Duplicate key values are non-fatal;
/// they surface as [`AmbiguousKeyWarning`]s on the result.
pub fn diff_tables(
    base: &Table,
    candidate: &Table,
    key: &KeyDescriptor,
    config: &DiffConfig,
) -> Result<DiffResult, DiffError> {
    if tables_identical(base, candidate) {
        return Ok(DiffResult {
            columns: candidate.columns().to_vec(),
            key_column: key.column_name().map(str::to_string),
            new_rows: Vec::new(),
            missing_rows: Vec::new(),
            changed_rows: Vec::new(),
            unchanged_count: candidate.n_rows(),
            identical: true,
            warnings: Vec::new(),
        });
    }

    let column_map = check_schema(base, candidate)?;

    let base_index = KeyIndex::build(base, key, Side::Base)?;
    let candidate_index = KeyIndex::build(candidate, key, Side::Candidate)?;

    let column_types: Vec<ColumnType> = column_map
        .iter()
        .enumerate()
        .map(|(cand_col, &base_col)| {
            effective_column_type(base.column_type(base_col), candidate.column_type(cand_col))
        })
        .collect();

    let mut new_rows = Vec::new();
    let mut changed_rows = Vec::new();
    let mut unchanged_count = 0usize;

    // Candidate row order keeps the result deterministic and aligned with
    // "what changed in the file I'm comparing".
    for (key_str, cand_row) in candidate_index.entries() {
        match base_index.row(key_str) {
            None => new_rows.push(candidate.row(cand_row).to_vec()),
            Some(base_row) => {
                let cells = compare_row(
                    base,
                    candidate,
                    base_row,
                    cand_row,
                    &column_map,
                    &column_types,
                    candidate_index.key_col,
                    config,
                );
                if cells.iter().any(CellVerdict::is_changed) {
                    changed_rows.push(ChangedRow {
                        key: key_str.to_string(),
                        row: cand_row,
                        cells,
                    });
                } else {
                    unchanged_count += 1;
                }
            }
        }
    }

    let mut missing_rows = Vec::new();
    for (key_str, base_row) in base_index.entries() {
        if !candidate_index.contains(key_str) {
            missing_rows.push(project_row(base.row(base_row), &column_map));
        }
    }

    let mut warnings = Vec::new();
    collect_warnings(&base_index, Side::Base, &mut warnings);
    collect_warnings(&candidate_index, Side::Candidate, &mut warnings);

    Ok(DiffResult {
        columns: candidate.columns().to_vec(),
        key_column: key.column_name().map(str::to_string),
        new_rows,
        missing_rows,
        changed_rows,
        unchanged_count,
        identical: false,
        warnings,
    })
}

/// Row-for-row identity: same columns in the same order, same values in the
/// same order. Fingerprints gate the scan; equality confirms a match so a
/// hash collision can never fake an identical verdict.
fn tables_identical(base: &Table, candidate: &Table) -> bool {
    base.columns() == candidate.columns()
        && base.n_rows() == candidate.n_rows()
        && base
            .rows()
            .zip(candidate.rows())
            .all(|(a, b)| row_fingerprint(a) == row_fingerprint(b) && a == b)
}

/// Order-independent column set check. On success, returns the mapping from
/// each candidate column index to the base column of the same name.
fn check_schema(base: &Table, candidate: &Table) -> Result<Vec<usize>, DiffError> {
    let missing_in_candidate: Vec<String> = base
        .columns()
        .iter()
        .filter(|name| candidate.column_index(name).is_none())
        .cloned()
        .collect();
    let missing_in_base: Vec<String> = candidate
        .columns()
        .iter()
        .filter(|name| base.column_index(name).is_none())
        .cloned()
        .collect();

    if !missing_in_candidate.is_empty() || !missing_in_base.is_empty() {
        return Err(DiffError::SchemaMismatch {
            missing_in_candidate,
            missing_in_base,
        });
    }

    Ok(candidate
        .columns()
        .iter()
        .filter_map(|name| base.column_index(name))
        .collect())
}

/// Two tables may tag the same column differently (one file's column went
/// fully numeric, the other kept a stray annotation). The numeric rule only
/// applies when both sides agree; disagreement demotes to textual comparison.
fn effective_column_type(base: ColumnType, candidate: ColumnType) -> ColumnType {
    if base == candidate {
        candidate
    } else {
        ColumnType::Other
    }
}

#[allow(clippy::too_many_arguments)]
fn compare_row(
    base: &Table,
    candidate: &Table,
    base_row: usize,
    cand_row: usize,
    column_map: &[usize],
    column_types: &[ColumnType],
    key_col: Option<usize>,
    config: &DiffConfig,
) -> Vec<CellVerdict> {
    (0..candidate.n_columns())
        .map(|col| {
            if Some(col) == key_col {
                // Keys matched canonically; the key cell is unchanged by
                // construction.
                return CellVerdict::Unchanged {
                    value: candidate.cell(cand_row, col).cloned(),
                };
            }
            compare_cells(
                base.cell(base_row, column_map[col]),
                candidate.cell(cand_row, col),
                column_types[col],
                config,
            )
        })
        .collect()
}

fn project_row(row: &[Option<Value>], column_map: &[usize]) -> Vec<Option<Value>> {
    column_map.iter().map(|&col| row[col].clone()).collect()
}

fn collect_warnings(index: &KeyIndex, side: Side, warnings: &mut Vec<AmbiguousKeyWarning>) {
    for dup in index.duplicates() {
        warnings.push(AmbiguousKeyWarning {
            side,
            key: dup.key,
            occurrences: dup.occurrences,
        });
    }
}
