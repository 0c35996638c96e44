//! Value coercion rules shared by the evaluator and the function library.

use serde_json::{Number as JsonNumber, Value as JsonValue};

use crate::error::CalcError;

/// Relaxed truthiness used by `if`, `and`, `or`, and `not`.
///
/// Zero, the empty string, null, and `false` are falsy; everything else is
/// truthy, including empty arrays and objects.
pub fn truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Emptiness rule behind `coalesce` and `is_empty`: null, whitespace-only
/// strings, empty arrays, and empty objects count as empty. Zero and `false`
/// do not.
pub fn is_empty(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.trim().is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Numeric coercion shared by math functions, ordered comparisons, and `num`.
///
/// Null and blank strings coerce to zero, booleans to 0/1. Anything that does
/// not parse as a finite number is an error rather than a silent `NaN`, so
/// invalid arithmetic cannot propagate through nested calls.
pub fn coerce_number(value: &JsonValue) -> Result<f64, CalcError> {
    match value {
        JsonValue::Null => Ok(0.0),
        JsonValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        JsonValue::Number(n) => n.as_f64().ok_or_else(|| {
            CalcError::EvalError(format!("expected number, got unrepresentable value {n}"))
        }),
        JsonValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            let n: f64 = trimmed.parse().map_err(|_| {
                CalcError::EvalError(format!("expected number, got '{trimmed}'"))
            })?;
            if n.is_finite() {
                Ok(n)
            } else {
                Err(CalcError::EvalError(format!(
                    "expected number, got '{trimmed}'"
                )))
            }
        }
        other => Err(CalcError::EvalError(format!(
            "expected number, got {}",
            type_name(other)
        ))),
    }
}

/// Converts a float into a JSON number, storing whole values as integers so
/// results serialize without a trailing `.0`. Non-finite input is an error;
/// a formula never yields `Infinity` or `NaN`.
pub fn number(value: f64) -> Result<JsonValue, CalcError> {
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        return Ok(JsonValue::Number(JsonNumber::from(value as i64)));
    }
    JsonNumber::from_f64(value)
        .map(JsonValue::Number)
        .ok_or_else(|| CalcError::EvalError(format!("invalid numeric result {value}")))
}

/// Strict equality for `eq`/`ne`: no cross-type coercion; numbers compare
/// numerically among themselves regardless of integer/float representation.
pub fn strict_eq(left: &JsonValue, right: &JsonValue) -> bool {
    match (left, right) {
        (JsonValue::Number(l), JsonValue::Number(r)) => l.as_f64() == r.as_f64(),
        _ => left == right,
    }
}

/// Rendering rule used by `concat` and the string functions: null renders as
/// the empty string, strings pass through, other values use their JSON form.
pub fn display_string(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Human-readable type name for error messages.
pub fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
