//! Helpers for walking wire-format JSON during validation.
//!
//! Map-level getters take a dotted field path; the leaf segment is the JSON
//! key, the full path appears in error messages.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::ValidationError;

fn leaf(field: &str) -> &str {
    field.rsplit('.').next().unwrap_or(field)
}

fn render(value: &Value) -> String {
    value.to_string()
}

pub(crate) fn require_object<'a>(
    value: &'a Value,
    field: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::TypeMismatch {
        field: field.to_string(),
        expected: "an object",
        received: render(value),
    })
}

pub(crate) fn require_array<'a>(
    value: &'a Value,
    field: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    value.as_array().ok_or_else(|| ValidationError::TypeMismatch {
        field: field.to_string(),
        expected: "an array",
        received: render(value),
    })
}

/// Fetch a required field, distinguishing "absent" from "present but wrong".
pub(crate) fn require<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Value, ValidationError> {
    obj.get(leaf(field)).ok_or_else(|| ValidationError::MissingField {
        field: field.to_string(),
    })
}

/// Fetch an optional field. Absent and `null` both read as `None`.
pub(crate) fn optional<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(leaf(field)).filter(|v| !v.is_null())
}

pub(crate) fn number(value: &Value, field: &str) -> Result<f64, ValidationError> {
    value.as_f64().ok_or_else(|| ValidationError::TypeMismatch {
        field: field.to_string(),
        expected: "a number",
        received: render(value),
    })
}

/// A whole number: either a JSON integer, or a float with no fractional part.
pub(crate) fn whole(value: &Value, field: &str) -> Result<i64, ValidationError> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    if let Some(f) = value.as_f64() {
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            return Ok(f as i64);
        }
    }
    Err(ValidationError::TypeMismatch {
        field: field.to_string(),
        expected: "a whole number",
        received: render(value),
    })
}

pub(crate) fn boolean(value: &Value, field: &str) -> Result<bool, ValidationError> {
    value.as_bool().ok_or_else(|| ValidationError::TypeMismatch {
        field: field.to_string(),
        expected: "a boolean",
        received: render(value),
    })
}

pub(crate) fn string<'a>(value: &'a Value, field: &str) -> Result<&'a str, ValidationError> {
    value.as_str().ok_or_else(|| ValidationError::TypeMismatch {
        field: field.to_string(),
        expected: "a string",
        received: render(value),
    })
}

pub(crate) fn timestamp(value: &Value, field: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = value.as_str().ok_or_else(|| ValidationError::InvalidTimestamp {
        field: field.to_string(),
        received: render(value),
    })?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp {
            field: field.to_string(),
            received: raw.to_string(),
        })
}

pub(crate) fn get_number(obj: &Map<String, Value>, field: &str) -> Result<f64, ValidationError> {
    number(require(obj, field)?, field)
}

pub(crate) fn get_whole(obj: &Map<String, Value>, field: &str) -> Result<i64, ValidationError> {
    whole(require(obj, field)?, field)
}

pub(crate) fn get_bool(obj: &Map<String, Value>, field: &str) -> Result<bool, ValidationError> {
    boolean(require(obj, field)?, field)
}

pub(crate) fn get_string(obj: &Map<String, Value>, field: &str) -> Result<String, ValidationError> {
    Ok(string(require(obj, field)?, field)?.to_string())
}

pub(crate) fn get_timestamp(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<DateTime<Utc>, ValidationError> {
    timestamp(require(obj, field)?, field)
}

pub(crate) fn opt_bool(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<Option<bool>, ValidationError> {
    optional(obj, field).map(|v| boolean(v, field)).transpose()
}

pub(crate) fn opt_string(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<Option<String>, ValidationError> {
    optional(obj, field)
        .map(|v| string(v, field).map(str::to_string))
        .transpose()
}
