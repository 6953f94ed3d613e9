//! Hash utilities for row fingerprinting.
//!
//! Fingerprints gate the identical-tables short-circuit; the engine always
//! confirms a fingerprint match with value equality before trusting it.

use std::hash::{Hash, Hasher};
use xxhash_rust::xxh3::Xxh3;

use crate::table::Value;

pub(crate) const XXH3_SEED: u64 = 0;

/// Map a float to the bit pattern used for hashing and equality: `-0.0`
/// collapses onto `0.0`, every NaN collapses onto one canonical pattern, and
/// the low mantissa bits are masked so sub-tolerance ULP drift from
/// serialization round-trips does not register as a change.
pub(crate) fn normalize_float_for_hash(n: f64) -> u64 {
    if n == 0.0 {
        return 0;
    }
    if n.is_nan() {
        return u64::MAX;
    }
    n.to_bits() & !0xFF
}

pub(crate) fn hash_cell(value: &Option<Value>, hasher: &mut Xxh3) {
    match value {
        None => 0u8.hash(hasher),
        Some(v) => {
            1u8.hash(hasher);
            v.hash(hasher);
        }
    }
}

pub(crate) fn row_fingerprint(row: &[Option<Value>]) -> u64 {
    let mut hasher = Xxh3::with_seed(XXH3_SEED);
    for cell in row {
        hash_cell(cell, &mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_for_equal_rows() {
        let a = vec![Some(Value::Number(1.0)), Some(Value::Text("x".into())), None];
        let b = vec![Some(Value::Number(1.0)), Some(Value::Text("x".into())), None];
        assert_eq!(row_fingerprint(&a), row_fingerprint(&b));
    }

    #[test]
    fn fingerprint_distinguishes_absent_from_empty_text() {
        let absent = vec![None];
        let empty = vec![Some(Value::Text(String::new()))];
        assert_ne!(row_fingerprint(&absent), row_fingerprint(&empty));
    }

    #[test]
    fn fingerprint_ignores_zero_sign() {
        let pos = vec![Some(Value::Number(0.0))];
        let neg = vec![Some(Value::Number(-0.0))];
        assert_eq!(row_fingerprint(&pos), row_fingerprint(&neg));
    }

    #[test]
    fn normalize_collapses_nan_payloads() {
        let a = normalize_float_for_hash(f64::NAN);
        let b = normalize_float_for_hash(-f64::NAN);
        assert_eq!(a, b);
    }

    #[test]
    fn normalize_keeps_meaningful_differences() {
        assert_ne!(
            normalize_float_for_hash(1.0),
            normalize_float_for_hash(1.0001)
        );
    }
}
