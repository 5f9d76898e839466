use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{
    ast::{BinOp, Expr, Literal, UnaryOp},
    compare::compare,
    key,
    number,
    object::AccessError,
    value::Value,
};

/// The key chain evaluator.
///
/// Walks a parsed [`Expr`] against a root object and a current object. An
/// evaluator owns the variable scope written by bare-key assignments
/// (`total = 5`) and read back by key lookups that the current object does not
/// answer. Evaluation never fails: type mismatches, missing keys and
/// out-of-range indexes all produce [`Value::Null`].
///
/// Host objects may evaluate expressions from inside their accessors, so the
/// scope is only borrowed for the duration of a single read or write.
#[derive(Debug, Default)]
pub struct Evaluator {
    /// Values assigned to bare keys
    variables: RefCell<HashMap<String, Value>>,
}

impl Evaluator {
    /// Creates an evaluator with an empty variable scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates `expr` with `current` as the object bare keys resolve against.
    ///
    /// When `current` is a non-empty list and the result is null, evaluation
    /// is retried against the list's first element.
    ///
    /// # Examples
    ///
    /// ```
    /// use keychain::{Evaluator, Value, parse};
    ///
    /// let people = Value::list([
    ///     Value::map([("name", Value::from("ada"))]),
    ///     Value::map([("name", Value::from("alan"))]),
    /// ]);
    ///
    /// let evaluator = Evaluator::new();
    /// assert_eq!(evaluator.eval(&people, &people, &parse("count")), Value::from(2));
    /// assert_eq!(evaluator.eval(&people, &people, &parse("name")), Value::from("ada"));
    /// ```
    pub fn eval(&self, root: &Value, current: &Value, expr: &Expr) -> Value {
        let value = self.eval_node(root, current, expr);
        if value.is_null()
            && current.list_len().is_some_and(|len| len > 0)
            && let Some(first) = current.list_get(0)
        {
            return self.eval_node(root, &first, expr);
        }
        value
    }

    fn eval_node(&self, root: &Value, current: &Value, expr: &Expr) -> Value {
        match expr {
            Expr::Literal(literal) => match literal {
                Literal::Null => Value::Null,
                Literal::Boolean(b) => Value::Boolean(*b),
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::String(s.clone()),
            },

            Expr::Key(name) => {
                let value = key::get_value(current, name);
                if value.is_null() {
                    self.variable(name).unwrap_or(Value::Null)
                } else {
                    value
                }
            }

            Expr::Unary { op, operand } => {
                let value = self.eval(root, current, operand);
                match op {
                    UnaryOp::Negate => number::negate(&value),
                    UnaryOp::Not => Value::Boolean(!value.to_bool()),
                }
            }

            Expr::Binary { op, left, right } => {
                // Both sides are always evaluated, even for && and ||.
                let left = self.eval(root, current, left);
                let right = self.eval(root, current, right);
                apply_binop(*op, &left, &right)
            }

            Expr::ArrayIndex { target, index } => {
                let list = self.eval(root, current, target);
                if list.list_len().is_none() {
                    return Value::Null;
                }
                let index = self.eval(root, root, index).to_i64();
                list.list_get(index).unwrap_or(Value::Null)
            }

            Expr::FunctionCall { target, .. } => {
                tracing::debug!(function = %target, "function calls are not implemented");
                Value::Null
            }

            // Only reachable as a function call's child.
            Expr::ArgList(_) => Value::Null,

            Expr::Chain(parts) => self.eval_chain(root, current, parts),

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval(root, current, condition).to_bool() {
                    self.eval(root, current, then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.eval(root, current, else_branch)
                } else {
                    Value::Null
                }
            }

            Expr::Assignment { target, value } => {
                let value = self.eval(root, current, value);
                match &**target {
                    Expr::Key(name) => {
                        self.set_variable(name, value);
                    }
                    target => {
                        if let Err(e) = self.assign(root, current, target, value) {
                            tracing::warn!(expr = %target, error = %e, "assignment failed");
                        }
                    }
                }
                // Assignment is a statement; it still has to yield something.
                Value::String(String::new())
            }
        }
    }

    /// Threads the running value through each segment; stops at null.
    fn eval_chain(&self, root: &Value, current: &Value, parts: &[Expr]) -> Value {
        let mut value = current.clone();
        for part in parts {
            if value.is_null() {
                return Value::Null;
            }
            value = self.eval(root, &value, part);
        }
        value
    }

    /// Stores `value` at the location `target` names, relative to `obj`.
    ///
    /// `target` is a key or a chain ending in a key. For a chain, every
    /// segment but the last is evaluated to find the object to write into.
    pub fn set_value(&self, obj: &Value, target: &Expr, value: Value) -> Result<(), AccessError> {
        self.assign(obj, obj, target, value)
    }

    fn assign(&self, root: &Value, current: &Value, target: &Expr, value: Value) -> Result<(), AccessError> {
        let (owner, last) = match target {
            Expr::Chain(parts) => match parts.split_last() {
                Some((last, prefix)) => (self.eval_chain(root, current, prefix), last),
                None => (current.clone(), target),
            },
            _ => (current.clone(), target),
        };

        match last {
            Expr::Key(name) => key::set_value(&owner, name, value),
            _ => Err(AccessError::NotAssignable {
                target: target.to_string(),
            }),
        }
    }

    /// Value last assigned to the bare key `name`.
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.variables.borrow().get(name).cloned()
    }

    pub fn set_variable(&self, name: &str, value: Value) {
        self.variables.borrow_mut().insert(name.to_string(), value);
    }

    /// Forgets every bare-key assignment.
    pub fn clear_variables(&self) {
        self.variables.borrow_mut().clear();
    }

    /// Evaluates to the natural string form; `None` for null.
    pub fn eval_string(&self, obj: &Value, expr: &Expr) -> Option<String> {
        self.eval(obj, obj, expr).text()
    }

    /// Evaluates to a number (parsing strings); null when there is none.
    pub fn eval_number(&self, obj: &Value, expr: &Expr) -> Value {
        self.eval(obj, obj, expr).to_number()
    }

    pub fn eval_int(&self, obj: &Value, expr: &Expr) -> i64 {
        self.eval(obj, obj, expr).to_i64()
    }

    pub fn eval_f64(&self, obj: &Value, expr: &Expr) -> f64 {
        self.eval(obj, obj, expr).to_f64()
    }

    pub fn eval_bool(&self, obj: &Value, expr: &Expr) -> bool {
        self.eval(obj, obj, expr).to_bool()
    }
}

fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Value {
    match op {
        BinOp::Add => add(left, right),
        BinOp::Subtract => number::subtract(left, right),
        BinOp::Multiply => number::multiply(left, right),
        BinOp::Divide => number::divide(left, right),
        BinOp::Mod => number::modulo(left, right),

        BinOp::Equal => Value::Boolean(compare(left, right) == Ordering::Equal),
        BinOp::NotEqual => Value::Boolean(compare(left, right) != Ordering::Equal),
        BinOp::GreaterThan => Value::Boolean(compare(left, right) == Ordering::Greater),
        BinOp::LessThan => Value::Boolean(compare(left, right) == Ordering::Less),
        BinOp::GreaterThanOrEqual => Value::Boolean(compare(left, right) != Ordering::Less),
        BinOp::LessThanOrEqual => Value::Boolean(compare(left, right) != Ordering::Greater),

        BinOp::And => Value::Boolean(left.to_bool() && right.to_bool()),
        BinOp::Or => Value::Boolean(left.to_bool() || right.to_bool()),
    }
}

/// `+` concatenates when either side is a string, adds when either side is
/// numeric and otherwise concatenates whatever has a string form.
fn add(left: &Value, right: &Value) -> Value {
    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        return concat(left, right);
    }
    if left.is_numeric() || right.is_numeric() {
        return number::add(&numeric_operand(left), &numeric_operand(right));
    }
    if left.is_null() && right.is_null() {
        return Value::Null;
    }
    concat(left, right)
}

fn numeric_operand(value: &Value) -> Value {
    match value.to_number() {
        Value::Null => Value::from(0),
        n => n,
    }
}

/// Null reads as empty; a value with no string form makes the result null.
fn concat(left: &Value, right: &Value) -> Value {
    let text = |v: &Value| if v.is_null() { Some(String::new()) } else { v.text() };
    match (text(left), text(right)) {
        (Some(a), Some(b)) => Value::String(a + &b),
        _ => Value::Null,
    }
}
