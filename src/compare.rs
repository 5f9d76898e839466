//! Total three-way comparison of values.

use std::cmp::Ordering;

use crate::value::Value;

/// Compares two values. Never fails: every pair of values is ordered.
///
/// - handles to the same shared value are equal
/// - a single null sorts after any non-string value and before a string
/// - strings compare case-insensitively
/// - numbers compare by `f64` value, dates chronologically, `false` before `true`
/// - a host object with a natural ordering decides for itself
/// - anything else is equal when equal by value, otherwise less
///
/// ```
/// use std::cmp::Ordering;
/// use keychain::{Value, compare::compare};
///
/// assert_eq!(compare(&Value::from("abc"), &Value::from("ABD")), Ordering::Less);
/// assert_eq!(compare(&Value::Null, &Value::from(1)), Ordering::Greater);
/// assert_eq!(compare(&Value::Null, &Value::from("")), Ordering::Less);
/// ```
pub fn compare(a: &Value, b: &Value) -> Ordering {
    if a.same_reference(b) {
        return Ordering::Equal;
    }

    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, Value::String(_)) => Ordering::Less,
        (Value::Null, _) => Ordering::Greater,
        (Value::String(_), Value::Null) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,

        (Value::String(x), Value::String(y)) => x
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(y.chars().flat_map(char::to_lowercase)),
        (x, y) if x.is_numeric() && y.is_numeric() => x
            .to_f64()
            .partial_cmp(&y.to_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),

        (Value::Object(obj), other) => match obj.compare_to(other) {
            Some(order) => order,
            None => by_equality(a, b),
        },
        _ => by_equality(a, b),
    }
}

fn by_equality(a: &Value, b: &Value) -> Ordering {
    if a == b { Ordering::Equal } else { Ordering::Less }
}
