//! Helpers shared by the per-tool response shapers.
//!
//! AMap returns most numbers as strings and omits or empties fields freely,
//! so every accessor here is total: missing data becomes `null`, `0` or an
//! empty slice, never an error.

use serde_json::{Map, Value};

use crate::domains::tools::ValidatedArgs;

/// Polylines longer than this are cut and suffixed with `...`.
pub const POLYLINE_PREVIEW_CHARS: usize = 200;

/// Object holding `fields` copied from `source`; absent fields become null.
pub fn pick(source: &Value, fields: &[&str]) -> Value {
    let mut out = Map::with_capacity(fields.len());
    for field in fields {
        out.insert(
            (*field).to_string(),
            source.get(*field).cloned().unwrap_or(Value::Null),
        );
    }
    Value::Object(out)
}

/// Array at `key`, or an empty slice.
pub fn list<'a>(source: &'a Value, key: &str) -> &'a [Value] {
    source
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Integer from a number or numeric string; 0 otherwise.
pub fn int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

/// Non-empty string at `key`.
pub fn text<'a>(source: &'a Value, key: &str) -> Option<&'a str> {
    source.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Page-size style argument used to cap result lists.
pub fn limit_arg(args: &ValidatedArgs, name: &str, default: usize) -> usize {
    args.get(name)
        .and_then(|v| v.parse().ok())
        .filter(|n: &usize| *n > 0)
        .unwrap_or(default)
}

/// Truncate long strings on a char boundary.
pub fn truncate(value: Option<&Value>, max_chars: usize) -> Value {
    match value.and_then(Value::as_str) {
        Some(s) if s.chars().count() > max_chars => {
            let head: String = s.chars().take(max_chars).collect();
            Value::String(format!("{head}..."))
        }
        Some(s) => Value::String(s.to_string()),
        None => Value::Null,
    }
}
