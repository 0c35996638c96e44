//! Built-in function library: closed name dispatch over evaluated arguments.

use serde_json::Value as JsonValue;

use crate::error::CalcError;

use super::value::{coerce_number, display_string, is_empty, number, strict_eq, truthy};

/// Invokes a built-in function with already-evaluated arguments.
///
/// Names outside the registry are valid syntax but fail here, at evaluation
/// time.
pub fn dispatch(name: &str, args: &[JsonValue]) -> Result<JsonValue, CalcError> {
    match name {
        "add" => {
            let mut sum = 0.0;
            for value in args {
                sum += coerce_number(value)?;
            }
            number(sum)
        }
        "sub" => {
            require_arity(name, args, 2)?;
            number(coerce_number(&args[0])? - coerce_number(&args[1])?)
        }
        "mul" => {
            let mut product = 1.0;
            for value in args {
                product *= coerce_number(value)?;
            }
            number(product)
        }
        "div" => {
            require_arity(name, args, 2)?;
            let divisor = coerce_number(&args[1])?;
            if divisor == 0.0 {
                return Err(CalcError::EvalError("division by zero".to_string()));
            }
            number(coerce_number(&args[0])? / divisor)
        }
        "round" => round(args),
        "ceil" => {
            require_arity(name, args, 1)?;
            number(coerce_number(&args[0])?.ceil())
        }
        "floor" => {
            require_arity(name, args, 1)?;
            number(coerce_number(&args[0])?.floor())
        }
        "abs" => {
            require_arity(name, args, 1)?;
            number(coerce_number(&args[0])?.abs())
        }
        "coalesce" => {
            for value in args {
                if !is_empty(value) {
                    return Ok(value.clone());
                }
            }
            Ok(JsonValue::Null)
        }
        "is_empty" => {
            require_arity(name, args, 1)?;
            Ok(JsonValue::Bool(is_empty(&args[0])))
        }
        "concat" => {
            let mut out = String::new();
            for value in args {
                out.push_str(&display_string(value));
            }
            Ok(JsonValue::String(out))
        }
        "upper" => string_transform(name, args, |s| s.to_uppercase()),
        "lower" => string_transform(name, args, |s| s.to_lowercase()),
        "trim" => string_transform(name, args, |s| s.trim().to_string()),
        "if" => {
            require_arity(name, args, 3)?;
            if truthy(&args[0]) {
                Ok(args[1].clone())
            } else {
                Ok(args[2].clone())
            }
        }
        "eq" => {
            require_arity(name, args, 2)?;
            Ok(JsonValue::Bool(strict_eq(&args[0], &args[1])))
        }
        "ne" => {
            require_arity(name, args, 2)?;
            Ok(JsonValue::Bool(!strict_eq(&args[0], &args[1])))
        }
        "gt" => compare(name, args, |a, b| a > b),
        "gte" => compare(name, args, |a, b| a >= b),
        "lt" => compare(name, args, |a, b| a < b),
        "lte" => compare(name, args, |a, b| a <= b),
        "and" => Ok(JsonValue::Bool(args.iter().all(truthy))),
        "or" => Ok(JsonValue::Bool(args.iter().any(truthy))),
        "not" => {
            require_arity(name, args, 1)?;
            Ok(JsonValue::Bool(!truthy(&args[0])))
        }
        "num" => {
            require_arity(name, args, 1)?;
            number(coerce_number(&args[0])?)
        }
        _ => Err(CalcError::EvalError(format!("unknown function '{name}'"))),
    }
}

/// `round(x, digits = 0)`: scale, round half up, unscale.
fn round(args: &[JsonValue]) -> Result<JsonValue, CalcError> {
    if args.is_empty() || args.len() > 2 {
        return Err(CalcError::EvalError(format!(
            "round expects 1 or 2 arguments, got {}",
            args.len()
        )));
    }
    let x = coerce_number(&args[0])?;
    let digits = match args.get(1) {
        Some(value) => coerce_number(value)? as i32,
        None => 0,
    };
    let factor = 10f64.powi(digits);
    number((x * factor + 0.5).floor() / factor)
}

fn compare(
    name: &str,
    args: &[JsonValue],
    cmp: fn(f64, f64) -> bool,
) -> Result<JsonValue, CalcError> {
    require_arity(name, args, 2)?;
    Ok(JsonValue::Bool(cmp(
        coerce_number(&args[0])?,
        coerce_number(&args[1])?,
    )))
}

fn string_transform(
    name: &str,
    args: &[JsonValue],
    transform: fn(&str) -> String,
) -> Result<JsonValue, CalcError> {
    require_arity(name, args, 1)?;
    if args[0].is_null() {
        return Ok(JsonValue::Null);
    }
    Ok(JsonValue::String(transform(&display_string(&args[0]))))
}

fn require_arity(name: &str, args: &[JsonValue], expected: usize) -> Result<(), CalcError> {
    if args.len() != expected {
        return Err(CalcError::EvalError(format!(
            "{name} expects {expected} arguments, got {}",
            args.len()
        )));
    }
    Ok(())
}
