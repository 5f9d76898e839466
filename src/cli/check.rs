//! Validate and evaluate key chains against JSON input

use super::{CliError, json_to_value};
use crate::{Map, Value, evaluate, try_parse};

/// Options for a single expression
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The key chain to evaluate
    pub expression: String,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Expression evaluated to this value
    Success(Value),
}

/// Parses the JSON document used as root object; an empty map when absent.
pub fn parse_input(json: Option<&str>) -> Result<Value, CliError> {
    match json {
        Some(text) => {
            let json_value: serde_json::Value =
                serde_json::from_str(text).map_err(CliError::Input)?;
            Ok(json_to_value(json_value))
        }
        None => Ok(Value::Map(Map::default())),
    }
}

/// Execute a check operation against `root`
///
/// Evaluation runs on the calling thread's evaluator, so a bare-key
/// assignment in one expression is visible to the next.
pub fn execute_check(options: &CheckOptions, root: &Value) -> Result<CheckResult, CliError> {
    let expr = try_parse(&options.expression).map_err(|error| CliError::Syntax {
        expression: options.expression.clone(),
        error,
    })?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    Ok(CheckResult::Success(evaluate(root, root, &expr)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(expression: &str, root: &Value) -> Value {
        let options = CheckOptions {
            expression: expression.to_string(),
            syntax_only: false,
        };
        match execute_check(&options, root) {
            Ok(CheckResult::Success(value)) => value,
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_evaluates_against_input() {
        let root = parse_input(Some(r#"{"price": 10, "qty": 3}"#)).unwrap();
        assert_eq!(run("price * qty", &root), Value::from(30));
    }

    #[test]
    fn test_syntax_only() {
        let options = CheckOptions {
            expression: "a +".to_string(),
            syntax_only: true,
        };
        assert!(matches!(
            execute_check(&options, &Value::Null),
            Err(CliError::Syntax { .. })
        ));
    }

    #[test]
    fn test_invalid_json_input() {
        assert!(matches!(parse_input(Some("{")), Err(CliError::Input(_))));
    }
}
