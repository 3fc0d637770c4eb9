//! Tolerant field lookup for provider payloads whose key names drift.
//!
//! Each helper takes an ordered list of candidate keys and returns the first
//! one that is present with a usable value.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// First non-blank string among `keys`, trimmed.
pub(crate) fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
    })
}

/// First numeric value among `keys` as `f64`.
pub(crate) fn first_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| value.get(key).and_then(Value::as_f64))
}

/// First timestamp among `keys`: an RFC 3339 string or unix seconds.
pub(crate) fn first_timestamp(value: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .find_map(|key| value.get(key).and_then(parse_timestamp))
}

#[allow(clippy::cast_possible_truncation)]
fn parse_timestamp(field: &Value) -> Option<DateTime<Utc>> {
    match field {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let secs = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_opt(secs, 0).single()
        }
        _ => None,
    }
}
