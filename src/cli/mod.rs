//! CLI support for keychain
//!
//! Evaluates key chains against a JSON document, so the binary can be used as
//! a calculator or to inspect documents from the shell.

mod check;
mod convert;

pub use check::{CheckOptions, CheckResult, execute_check, parse_input};
pub use convert::{json_to_value, value_to_json};

use std::fmt;
use std::io;

/// Why the binary could not produce a result for an expression.
#[derive(Debug)]
pub enum CliError {
    /// The `--input` document is not valid JSON
    Input(serde_json::Error),
    /// An expression does not parse
    Syntax {
        expression: String,
        error: crate::ParseError,
    },
    /// Expressions could not be read from stdin
    Stdin(io::Error),
    /// A result could not be written as JSON
    Output(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Input(e) => write!(f, "Invalid JSON input: {}", e),
            CliError::Syntax { expression, error } => {
                write!(f, "Syntax error in `{}`: {}", expression, error)
            }
            CliError::Stdin(e) => write!(f, "Cannot read expressions from stdin: {}", e),
            CliError::Output(e) => write!(f, "Cannot encode result as JSON: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Input(e) | CliError::Output(e) => Some(e),
            CliError::Syntax { error, .. } => Some(error),
            CliError::Stdin(e) => Some(e),
        }
    }
}
