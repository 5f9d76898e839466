//! Key chains: a small expression language for reading and writing values on
//! object graphs.
//!
//! A key chain such as `order.lines[0].price * 1.2` is parsed once into an
//! [`Expr`] and evaluated against a root [`Value`]. Names resolve against
//! maps, lists, strings and host objects implementing [`KeyObject`].
//!
//! ```
//! use keychain::Value;
//!
//! let order = Value::map([
//!     ("customer", Value::map([("name", Value::from("ada"))])),
//!     ("total", Value::from(40)),
//! ]);
//!
//! assert_eq!(keychain::value(&order, "customer.name"), Value::from("ada"));
//! assert_eq!(keychain::value(&order, "total > 30 ? 'big' : 'small'"), Value::from("big"));
//!
//! keychain::set_value(&order, "customer.name", Value::from("grace")).unwrap();
//! assert_eq!(keychain::string_value(&order, "customer.name").as_deref(), Some("grace"));
//! ```
//!
//! The free functions here share a process-wide [`ParseCache`] and a
//! per-thread [`Evaluator`], so bare-key assignments (`x = 1`) made on one
//! thread are never visible on another.

pub mod ast;
pub mod cache;
pub mod compare;
pub mod evaluator;
pub mod key;
pub mod lexer;
pub mod number;
pub mod object;
pub mod parser;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

use std::sync::Arc;

pub use ast::{BinOp, Expr, Literal, Op, Token, UnaryOp};
pub use cache::ParseCache;
pub use evaluator::Evaluator;
pub use lexer::{LexError, Lexer, Position};
pub use object::{AccessError, KeyObject, Property};
pub use parser::{ParseError, Parser, last_error, parse, take_last_error, try_parse};
pub use value::{List, Map, Value};

thread_local! {
    static EVALUATOR: Evaluator = Evaluator::new();
}

/// Parses `source` through the process-wide cache.
pub fn get_or_parse(source: &str) -> Arc<Expr> {
    cache::global().get_or_parse(source)
}

/// Evaluates `expr` on this thread's evaluator.
pub fn evaluate(root: &Value, current: &Value, expr: &Expr) -> Value {
    EVALUATOR.with(|evaluator| evaluator.eval(root, current, expr))
}

/// Evaluates the key chain `source` with `obj` as root and current object.
pub fn value(obj: &Value, source: &str) -> Value {
    let expr = get_or_parse(source);
    evaluate(obj, obj, &expr)
}

pub fn string_value(obj: &Value, source: &str) -> Option<String> {
    value(obj, source).text()
}

pub fn number_value(obj: &Value, source: &str) -> Value {
    value(obj, source).to_number()
}

pub fn int_value(obj: &Value, source: &str) -> i64 {
    value(obj, source).to_i64()
}

pub fn f64_value(obj: &Value, source: &str) -> f64 {
    value(obj, source).to_f64()
}

pub fn bool_value(obj: &Value, source: &str) -> bool {
    value(obj, source).to_bool()
}

/// Writes `value` at the key or dotted path `source` below `obj`.
///
/// A failure is logged and returned; the target is left unmodified.
pub fn set_value(obj: &Value, source: &str, value: Value) -> Result<(), AccessError> {
    let expr = get_or_parse(source);
    EVALUATOR
        .with(|evaluator| evaluator.set_value(obj, &expr, value))
        .inspect_err(|e| tracing::warn!(source, error = %e, "setting key chain failed"))
}

/// [`set_value`], discarding the logged error.
pub fn set_value_safe(obj: &Value, source: &str, value: Value) {
    let _ = set_value(obj, source, value);
}

/// [`set_value`] without logging.
pub fn set_value_silent(obj: &Value, source: &str, value: Value) {
    let expr = get_or_parse(source);
    let _ = EVALUATOR.with(|evaluator| evaluator.set_value(obj, &expr, value));
}

/// Value last assigned to the bare key `name` on this thread.
pub fn thread_variable(name: &str) -> Option<Value> {
    EVALUATOR.with(|evaluator| evaluator.variable(name))
}

/// Forgets this thread's bare-key assignments.
///
/// Threads reused across unrelated requests should call this between them.
pub fn clear_thread_variables() {
    EVALUATOR.with(Evaluator::clear_variables);
}
