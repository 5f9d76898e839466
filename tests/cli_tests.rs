// tests/cli_tests.rs
#![cfg(feature = "cli")]

use keychain::Value;
use keychain::cli::{CheckOptions, CheckResult, CliError, execute_check, parse_input, value_to_json};
use pretty_assertions::assert_eq;
use serde_json::json;

fn check(expression: &str, root: &Value) -> Result<CheckResult, CliError> {
    let options = CheckOptions {
        expression: expression.to_string(),
        syntax_only: false,
    };
    execute_check(&options, root)
}

fn eval_json(expression: &str, input: &str) -> serde_json::Value {
    let root = parse_input(Some(input)).unwrap();
    match check(expression, &root) {
        Ok(CheckResult::Success(value)) => value_to_json(&value),
        other => panic!("unexpected result for {}: {:?}", expression, other),
    }
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn test_missing_input_is_empty_map() {
    let root = parse_input(None).unwrap();
    assert_eq!(value_to_json(&root), json!({}));
}

#[test]
fn test_invalid_input() {
    assert!(matches!(parse_input(Some("[1, 2")), Err(CliError::Input(_))));
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_document_paths() {
    let input = r#"{"order": {"lines": [{"price": 2.5, "qty": 4}, {"price": 1, "qty": 1}]}}"#;
    assert_eq!(eval_json("order.lines[0].price * order.lines[0].qty", input), json!(10));
    assert_eq!(eval_json("order.lines.size", input), json!(2));
    assert_eq!(eval_json("order.lines.price", input), json!(2.5));
    assert_eq!(eval_json("order.missing", input), json!(null));
}

#[test]
fn test_results_render_as_json() {
    let input = r#"{"name": "Ada", "tags": ["x", "y"]}"#;
    assert_eq!(eval_json("name.upperCase", input), json!("ADA"));
    assert_eq!(eval_json("tags", input), json!(["x", "y"]));
    assert_eq!(eval_json("1 / 0", input), json!(null));
    assert_eq!(eval_json("1 / 4", input), json!(0.25));
}

#[test]
fn test_assignment_writes_into_document() {
    let root = parse_input(Some(r#"{"a": {"b": 1}}"#)).unwrap();
    assert!(matches!(check("a.c = a.b + 1", &root), Ok(CheckResult::Success(_))));
    assert_eq!(value_to_json(&root), json!({"a": {"b": 1, "c": 2}}));
}

// ============================================================================
// Syntax checks
// ============================================================================

#[test]
fn test_syntax_only_skips_evaluation() {
    let root = parse_input(Some(r#"{"n": 1}"#)).unwrap();
    let options = CheckOptions {
        expression: "n = 2".to_string(),
        syntax_only: true,
    };
    assert!(matches!(execute_check(&options, &root), Ok(CheckResult::SyntaxValid)));
    assert_eq!(value_to_json(&root), json!({"n": 1}));
}

#[test]
fn test_parse_error_is_reported() {
    match check("a + * b", &Value::Null) {
        Err(e @ CliError::Syntax { .. }) => {
            assert!(e.to_string().starts_with("Syntax error in `a + * b`: "), "{}", e);
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}
