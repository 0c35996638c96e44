pub mod error;
pub mod expr;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub use error::CalcError;
use expr::eval::evaluate;
pub use expr::parse_expression;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Single failure entry in a result envelope.
pub struct EvalMessage {
    /// Field key the failure belongs to, when produced by a batch evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Human-readable failure description.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Result envelope returned by [`evaluate_formula`].
///
/// No failure crosses this boundary as an error or panic. A null `value` with
/// empty `errors` is a legitimate success, for example a `ref()` to a path the
/// context does not contain.
pub struct EvalResult {
    /// Evaluated value, or null when evaluation failed.
    pub value: JsonValue,
    /// Failure messages; empty on success.
    pub errors: Vec<EvalMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Batch output of [`evaluate_fields`].
pub struct FieldValues {
    /// Per-field evaluated values; failed fields hold null.
    pub values: BTreeMap<String, JsonValue>,
    /// Failure messages tagged with the originating field key.
    pub errors: Vec<EvalMessage>,
}

/// Evaluates one formula against a context value.
///
/// Runs tokenize, parse, evaluate; any failure at any stage is converted into
/// the envelope rather than propagated, so one malformed formula can never
/// abort a batch of field computations or crash the host pipeline.
pub fn evaluate_formula(source: &str, context: &JsonValue) -> EvalResult {
    match parse_and_eval(source, context) {
        Ok(value) => EvalResult {
            value,
            errors: Vec::new(),
        },
        Err(err) => EvalResult {
            value: JsonValue::Null,
            errors: vec![EvalMessage {
                key: None,
                message: err.to_string(),
            }],
        },
    }
}

/// Evaluates a keyed map of formulas against one shared context.
///
/// Fields are evaluated independently in key order. A failing formula yields
/// a null value plus an error tagged with its field key and leaves the rest of
/// the batch untouched.
pub fn evaluate_fields(fields: &BTreeMap<String, String>, context: &JsonValue) -> FieldValues {
    let mut values = BTreeMap::new();
    let mut errors = Vec::new();

    for (key, source) in fields {
        match parse_and_eval(source, context) {
            Ok(value) => {
                values.insert(key.clone(), value);
            }
            Err(err) => {
                values.insert(key.clone(), JsonValue::Null);
                errors.push(EvalMessage {
                    key: Some(key.clone()),
                    message: err.to_string(),
                });
            }
        }
    }

    FieldValues { values, errors }
}

fn parse_and_eval(source: &str, context: &JsonValue) -> Result<JsonValue, CalcError> {
    let expr = parse_expression(source)?;
    evaluate(&expr, context)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::{json, Value as JsonValue};

    use crate::{evaluate_fields, evaluate_formula, parse_expression};

    fn ok(source: &str, context: &JsonValue) -> JsonValue {
        let result = evaluate_formula(source, context);
        assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
        result.value
    }

    #[test]
    fn evaluates_number_literal() {
        assert_eq!(ok("42", &json!({})), json!(42));
        assert_eq!(ok("-3.5", &json!({})), json!(-3.5));
    }

    #[test]
    fn evaluates_nested_arithmetic() {
        assert_eq!(ok("add(mul(2,3), sub(10,4))", &json!({})), json!(12));
    }

    #[test]
    fn resolves_references_from_context() {
        let ctx = json!({"a": {"b": 42}});
        assert_eq!(ok("ref('a.b')", &ctx), json!(42));
        // Missing paths resolve to null without error.
        assert_eq!(ok("ref('a.c')", &ctx), JsonValue::Null);
    }

    #[test]
    fn failure_produces_envelope_not_panic() {
        let result = evaluate_formula("div(10, 0)", &json!({}));
        assert_eq!(result.value, JsonValue::Null);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("division by zero"));
        assert!(result.errors[0].key.is_none());
    }

    #[test]
    fn unknown_function_names_the_function() {
        let result = evaluate_formula("bogus(1)", &json!({}));
        assert!(result.errors[0].message.contains("bogus"));
    }

    #[test]
    fn conditional_text_from_context() {
        let formula = "if(gt(ref('x'), 5), 'big', 'small')";
        assert_eq!(ok(formula, &json!({"x": 10})), json!("big"));
        assert_eq!(ok(formula, &json!({"x": 2})), json!("small"));
    }

    #[test]
    fn batch_isolates_failing_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("total".to_string(), "mul(ref('qty'), ref('price'))".to_string());
        fields.insert("broken".to_string(), "div(1, 0)".to_string());

        let out = evaluate_fields(&fields, &json!({"qty": 3, "price": 4}));
        assert_eq!(out.values["total"], json!(12));
        assert_eq!(out.values["broken"], JsonValue::Null);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].key.as_deref(), Some("broken"));
    }

    #[test]
    fn envelope_serializes_without_absent_key() {
        let result = evaluate_formula("1 2", &json!({}));
        let serialized = serde_json::to_value(&result).unwrap();
        assert_eq!(serialized["value"], JsonValue::Null);
        assert!(serialized["errors"][0].get("key").is_none());
        assert!(serialized["errors"][0]["message"].is_string());
    }

    #[test]
    fn parse_expression_validates_without_context() {
        assert!(parse_expression("add(1, ref('a'))").is_ok());
        assert!(parse_expression("add(1,").is_err());
    }
}
