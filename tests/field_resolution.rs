use std::collections::BTreeMap;

use serde_json::{json, Value as JsonValue};

use fieldcalc::{evaluate_fields, evaluate_formula};

fn fields(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn computes_derived_permit_fields() {
    let ctx = json!({
        "project": {"units": 12, "rate_per_unit": 35.5},
        "applicant": {"name": "jansen bv"}
    });
    let fields = fields(&[
        ("fee", "round(mul(ref('project.units'), ref('project.rate_per_unit')), 2)"),
        ("applicant_display", "upper(trim(ref('applicant.name')))"),
        (
            "fee_class",
            "if(gt(ref('project.units'), 10), 'large', 'small')",
        ),
    ]);

    let out = evaluate_fields(&fields, &ctx);
    assert!(out.errors.is_empty());
    assert_eq!(out.values["fee"], json!(426));
    assert_eq!(out.values["applicant_display"], json!("JANSEN BV"));
    assert_eq!(out.values["fee_class"], json!("large"));
}

#[test]
fn one_failing_field_does_not_abort_the_batch() {
    let ctx = json!({"qty": 3});
    let fields = fields(&[
        ("good", "mul(ref('qty'), 2)"),
        ("bad_syntax", "add(1,"),
        ("bad_eval", "div(1, 0)"),
    ]);

    let out = evaluate_fields(&fields, &ctx);
    assert_eq!(out.values["good"], json!(6));
    assert_eq!(out.values["bad_syntax"], JsonValue::Null);
    assert_eq!(out.values["bad_eval"], JsonValue::Null);

    assert_eq!(out.errors.len(), 2);
    let keys: Vec<_> = out.errors.iter().filter_map(|e| e.key.as_deref()).collect();
    assert_eq!(keys, vec!["bad_eval", "bad_syntax"]);
}

#[test]
fn batch_errors_carry_their_field_key_when_serialized() {
    let out = evaluate_fields(&fields(&[("broken", "div(1, 0)")]), &json!({}));
    let serialized = serde_json::to_value(&out).unwrap();
    assert_eq!(serialized["errors"][0]["key"], json!("broken"));
    assert!(serialized["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("division by zero"));
}

#[test]
fn single_formula_envelope_shape() {
    let ok = evaluate_formula("add(1, 2, 3)", &json!({}));
    assert_eq!(
        serde_json::to_value(&ok).unwrap(),
        json!({"value": 6, "errors": []})
    );

    let failed = evaluate_formula("'open", &json!({}));
    let serialized = serde_json::to_value(&failed).unwrap();
    assert_eq!(serialized["value"], JsonValue::Null);
    // `key` is omitted for single-formula failures.
    assert!(serialized["errors"][0].get("key").is_none());
}

#[test]
fn null_success_is_distinct_from_failure() {
    let missing = evaluate_formula("ref('nothing.here')", &json!({}));
    assert_eq!(missing.value, JsonValue::Null);
    assert!(missing.errors.is_empty());

    let failed = evaluate_formula("div(1, 0)", &json!({}));
    assert_eq!(failed.value, JsonValue::Null);
    assert!(!failed.errors.is_empty());
}

#[test]
fn context_is_never_mutated() {
    let ctx = json!({"a": {"b": 1}});
    let before = ctx.clone();
    let _ = evaluate_formula("add(ref('a.b'), 1)", &ctx);
    let _ = evaluate_fields(&fields(&[("x", "ref('a')")]), &ctx);
    assert_eq!(ctx, before);
}

#[test]
fn error_stages_are_distinguishable() {
    let lex = evaluate_formula("'abc", &json!({}));
    assert!(lex.errors[0].message.starts_with("lex error"));

    let parse = evaluate_formula("1 2", &json!({}));
    assert!(parse.errors[0].message.starts_with("parse error"));

    let eval = evaluate_formula("bogus()", &json!({}));
    assert!(eval.errors[0].message.starts_with("eval error"));
}
