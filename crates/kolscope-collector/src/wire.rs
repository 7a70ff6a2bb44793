//! Field-level helpers for the upstream timeline wire format.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Parses the legacy timestamp format, e.g. `"Wed Oct 10 14:22:30 +0000 2024"`.
pub(crate) fn parse_twitter_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %z %Y")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Reads a numeric field that the upstream serializes as either a JSON number
/// or a decimal string (view counts in particular). Missing or malformed
/// values read as 0.
pub(crate) fn count_field(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

pub(crate) fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}
