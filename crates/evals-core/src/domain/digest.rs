//! Canonical JSON form and SHA-256 digests.
//!
//! Cache keys are derived from these digests, so two values that differ only in
//! object key insertion order or in `1` vs `1.0` must hash identically.

use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

use crate::domain::error::{EvalError, Result};

/// Rewrite `value` with sorted object keys and integer-valued floats as integers.
fn canonicalize(value: &Value) -> Result<Value> {
    match value {
        // `Map` is ordered by key, so rebuilding it yields byte-wise sorted keys.
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| canonicalize(item).map(|item| (key.clone(), item)))
            .collect::<Result<Map<String, Value>>>()
            .map(Value::Object),
        Value::Array(items) => items
            .iter()
            .map(canonicalize)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Number(n) if n.is_f64() => {
            let f = n.as_f64().unwrap_or(f64::NAN);
            if !f.is_finite() {
                return Err(EvalError::InvalidArgument(
                    "NaN/Infinity not permitted in canonical JSON".to_string(),
                ));
            }
            // `i64::MAX as f64` rounds up to 2^63, which is out of range.
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                Ok(Value::Number(Number::from(f as i64)))
            } else {
                Ok(value.clone())
            }
        }
        other => Ok(other.clone()),
    }
}

/// Serialize `value` in canonical form (compact, sorted keys, normalized numbers).
pub fn canonical_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(&canonicalize(value)?)?)
}

/// SHA-256 hex digest of the canonical form of `value`.
pub fn compute_digest(value: &Value) -> Result<String> {
    let canonical = canonical_json(value)?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}
