//! Runtime evaluator for formula AST nodes.

use serde_json::Value as JsonValue;

use crate::error::CalcError;

use super::functions;
use super::parser::Expr;

/// Evaluates a formula AST node against a read-only context value.
///
/// Evaluation is eager: every call argument is evaluated left-to-right before
/// dispatch, including both branches of `if` and every operand of `and`/`or`.
/// Nothing in the language short-circuits.
pub fn evaluate(expr: &Expr, context: &JsonValue) -> Result<JsonValue, CalcError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Reference(path) => Ok(resolve_reference(path, context)),
        Expr::Call { name, args } => {
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(evaluate(arg, context)?);
            }
            functions::dispatch(name, &evaluated)
        }
    }
}

/// Walks a dotted reference path through the context object.
///
/// A missing key or non-object intermediate resolves to null; absent data is
/// an ordinary outcome for a formula, not an error.
fn resolve_reference(path: &str, context: &JsonValue) -> JsonValue {
    let mut current = context;
    for segment in path.split('.') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match current.as_object().and_then(|map| map.get(segment)) {
            Some(next) => current = next,
            None => return JsonValue::Null,
        }
    }
    current.clone()
}
