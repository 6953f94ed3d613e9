//! Scalar cell comparison.
//!
//! One comparator replaces the per-call-site comparison closures the rest of
//! the engine would otherwise need: it dispatches on the column's semantic
//! type tag and produces a [`CellVerdict`]. The function is pure and total:
//! every pairing of inputs yields a verdict, and anything that cannot be
//! compared confidently is reported as changed rather than silently equal.

use crate::config::DiffConfig;
use crate::table::{ColumnType, Value};
use serde::{Deserialize, Serialize};

/// Outcome of comparing one base cell against its candidate counterpart.
///
/// `Unchanged` carries the candidate value so renderers can show complete
/// rows with selective highlighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellVerdict {
    Unchanged {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    Changed {
        from: Option<Value>,
        to: Option<Value>,
    },
}

impl CellVerdict {
    pub fn is_changed(&self) -> bool {
        matches!(self, CellVerdict::Changed { .. })
    }

    /// The candidate-side value, whichever variant this is.
    pub fn candidate_value(&self) -> Option<&Value> {
        match self {
            CellVerdict::Unchanged { value } => value.as_ref(),
            CellVerdict::Changed { to, .. } => to.as_ref(),
        }
    }
}

/// Compare two cells under a column's type tag.
///
/// Absence is a distinct value: two absent cells are equal, an absent cell
/// never equals a present one. Numeric columns compare with absolute
/// tolerance; values that do not yield a number fall back to the text rule.
/// Text comparison trims surrounding whitespace and is case-sensitive unless
/// the config relaxes it.
pub fn compare_cells(
    base: Option<&Value>,
    candidate: Option<&Value>,
    column_type: ColumnType,
    config: &DiffConfig,
) -> CellVerdict {
    match (base, candidate) {
        (None, None) => CellVerdict::Unchanged { value: None },
        (None, Some(_)) | (Some(_), None) => changed(base, candidate),
        (Some(b), Some(c)) => {
            if column_type == ColumnType::Numeric {
                if let (Some(x), Some(y)) = (b.to_number(), c.to_number()) {
                    return numeric_verdict(x, y, base, candidate, config.numeric_tolerance);
                }
            }
            text_verdict(b, c, base, candidate, config)
        }
    }
}

fn numeric_verdict(
    x: f64,
    y: f64,
    base: Option<&Value>,
    candidate: Option<&Value>,
    tolerance: f64,
) -> CellVerdict {
    if x.is_nan() && y.is_nan() {
        return unchanged(candidate);
    }
    if x.is_nan() || y.is_nan() {
        return changed(base, candidate);
    }
    if (x - y).abs() > tolerance {
        changed(base, candidate)
    } else {
        unchanged(candidate)
    }
}

fn text_verdict(
    b: &Value,
    c: &Value,
    base: Option<&Value>,
    candidate: Option<&Value>,
    config: &DiffConfig,
) -> CellVerdict {
    let mut lhs = b.canonical_string();
    let mut rhs = c.canonical_string();
    if config.case_insensitive {
        lhs = lhs.to_lowercase();
        rhs = rhs.to_lowercase();
    }
    if lhs == rhs {
        unchanged(candidate)
    } else {
        changed(base, candidate)
    }
}

fn unchanged(candidate: Option<&Value>) -> CellVerdict {
    CellVerdict::Unchanged {
        value: candidate.cloned(),
    }
}

fn changed(base: Option<&Value>, candidate: Option<&Value>) -> CellVerdict {
    CellVerdict::Changed {
        from: base.cloned(),
        to: candidate.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_NUMERIC_TOLERANCE;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn cfg() -> DiffConfig {
        DiffConfig::default()
    }

    #[test]
    fn both_absent_is_unchanged() {
        let verdict = compare_cells(None, None, ColumnType::Text, &cfg());
        assert!(!verdict.is_changed());
    }

    #[test]
    fn one_absent_is_changed() {
        let b = num(1.0);
        assert!(compare_cells(Some(&b), None, ColumnType::Numeric, &cfg()).is_changed());
        assert!(compare_cells(None, Some(&b), ColumnType::Numeric, &cfg()).is_changed());
    }

    #[test]
    fn numeric_within_tolerance_is_unchanged() {
        // 0.0 and the tolerance itself are exactly representable, so the
        // difference is exactly the tolerance.
        let b = num(0.0);
        let c = num(DEFAULT_NUMERIC_TOLERANCE);
        let verdict = compare_cells(Some(&b), Some(&c), ColumnType::Numeric, &cfg());
        assert!(!verdict.is_changed(), "difference of exactly the tolerance");
    }

    #[test]
    fn numeric_beyond_tolerance_is_changed() {
        let b = num(0.0);
        let c = num(DEFAULT_NUMERIC_TOLERANCE * 2.0);
        let verdict = compare_cells(Some(&b), Some(&c), ColumnType::Numeric, &cfg());
        assert!(verdict.is_changed());
    }

    #[test]
    fn numeric_column_coerces_numeric_text() {
        let b = num(1.0);
        let c = text(" 1.0 ");
        let verdict = compare_cells(Some(&b), Some(&c), ColumnType::Numeric, &cfg());
        assert!(!verdict.is_changed(), "1 and \" 1.0 \" coerce to the same number");
    }

    #[test]
    fn numeric_column_falls_back_to_text_on_unparseable() {
        let b = text("n/a");
        let c = text("n/a");
        assert!(!compare_cells(Some(&b), Some(&c), ColumnType::Numeric, &cfg()).is_changed());

        let d = text("pending");
        assert!(compare_cells(Some(&b), Some(&d), ColumnType::Numeric, &cfg()).is_changed());
    }

    #[test]
    fn nan_vs_nan_is_unchanged_nan_vs_number_is_changed() {
        let nan = num(f64::NAN);
        let one = num(1.0);
        assert!(!compare_cells(Some(&nan), Some(&nan), ColumnType::Numeric, &cfg()).is_changed());
        assert!(compare_cells(Some(&nan), Some(&one), ColumnType::Numeric, &cfg()).is_changed());
        assert!(compare_cells(Some(&one), Some(&nan), ColumnType::Numeric, &cfg()).is_changed());
    }

    #[test]
    fn text_trims_surrounding_whitespace_only() {
        let b = text(" Juan");
        let c = text("Juan");
        assert!(!compare_cells(Some(&b), Some(&c), ColumnType::Text, &cfg()).is_changed());

        let d = text("Juan ");
        let e = text("juan");
        assert!(compare_cells(Some(&d), Some(&e), ColumnType::Text, &cfg()).is_changed());
    }

    #[test]
    fn case_insensitive_config_relaxes_text_rule() {
        let config = DiffConfig::builder()
            .case_insensitive(true)
            .build()
            .unwrap();
        let b = text("Juan");
        let c = text("juan");
        assert!(!compare_cells(Some(&b), Some(&c), ColumnType::Text, &config).is_changed());
    }

    #[test]
    fn interior_whitespace_still_counts() {
        let b = text("Juan Perez");
        let c = text("Juan  Perez");
        assert!(compare_cells(Some(&b), Some(&c), ColumnType::Text, &cfg()).is_changed());
    }

    #[test]
    fn cross_type_pairings_compare_canonically() {
        // A numeric 1 against text "1" in a text-tagged column: canonical
        // strings agree.
        let b = num(1.0);
        let c = text("1");
        assert!(!compare_cells(Some(&b), Some(&c), ColumnType::Text, &cfg()).is_changed());

        let d = Value::Bool(true);
        let e = text("yes");
        assert!(compare_cells(Some(&d), Some(&e), ColumnType::Other, &cfg()).is_changed());
    }

    #[test]
    fn changed_verdict_carries_both_sides() {
        let b = num(25.0);
        let c = num(26.0);
        let verdict = compare_cells(Some(&b), Some(&c), ColumnType::Numeric, &cfg());
        assert_eq!(
            verdict,
            CellVerdict::Changed {
                from: Some(num(25.0)),
                to: Some(num(26.0)),
            }
        );
        assert_eq!(verdict.candidate_value(), Some(&num(26.0)));
    }
}
