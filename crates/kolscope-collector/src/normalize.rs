//! Normalizer for the upstream's doubly-JSON-encoded envelopes.
//!
//! The X-data proxy wraps the real payload in an outer envelope whose `data`
//! field is itself a string-encoded JSON document, sometimes more than one
//! level deep. [`normalize_nested_json`] parses strings back into structure
//! wherever they decode as JSON, so the timeline parsers can walk a plain
//! object tree instead of scattering `serde_json::from_str` call sites.

use serde_json::Value;

/// Recursively re-parses string-encoded JSON until the tree holds only plain
/// values.
///
/// Strings that are not valid JSON documents are left untouched, as are all
/// non-string scalars.
#[must_use]
pub fn normalize_nested_json(value: Value) -> Value {
    match value {
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            // Bare JSON scalars ("42", "true") are almost always ordinary
            // text fields, not double-encoded documents. Only recurse into
            // containers.
            Ok(inner @ (Value::Object(_) | Value::Array(_))) => normalize_nested_json(inner),
            _ => Value::String(s),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_nested_json).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_nested_json(v)))
                .collect(),
        ),
        other => other,
    }
}
