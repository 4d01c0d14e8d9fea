//! Fingerprints - SHA-256 over Canonical JSON
//!
//! Stable keys for memoizing validation and identifying rule tables.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// SHA-256 of bytes as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Canonical JSON: object keys sorted at every depth, no whitespace
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v = serde_json::to_value(value)?;
    serde_json::to_string(&sort_keys(v))
}

fn sort_keys(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Fingerprint of any serializable value
pub fn compute_fingerprint<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(value)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// Memoization key for a single validator call.
/// key = sha256(platform + canonical_input + rules_fingerprint)
pub fn validation_key(
    platform: &str,
    input: &impl Serialize,
    rules_fingerprint: &str,
) -> Result<String, serde_json::Error> {
    let canonical_input = canonical_json(input)?;
    let combined = format!("{}:{}:{}", platform, canonical_input, rules_fingerprint);
    Ok(sha256_hex(combined.as_bytes()))
}
