//! Arithmetic on numeric values.
//!
//! Operations run on exact decimals and fall back to `f64` when an operand
//! has no decimal form (infinities, NaN) or the decimal result overflows.
//! Non-numeric operands yield [`Value::Null`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::value::Value;

/// Fractional digits kept by [`divide`].
pub const DIVISION_SCALE: u32 = 16;

enum Operands {
    Exact(Decimal, Decimal),
    Float(f64, f64),
}

fn operands(a: &Value, b: &Value) -> Option<Operands> {
    if !a.is_numeric() || !b.is_numeric() {
        return None;
    }
    Some(match (a.as_decimal(), b.as_decimal()) {
        (Some(x), Some(y)) => Operands::Exact(x, y),
        _ => Operands::Float(a.to_f64(), b.to_f64()),
    })
}

fn exact_or_float(
    a: &Value,
    b: &Value,
    exact: fn(Decimal, Decimal) -> Option<Decimal>,
    float: fn(f64, f64) -> f64,
) -> Value {
    match operands(a, b) {
        Some(Operands::Exact(x, y)) => match exact(x, y) {
            Some(n) => Value::Number(n),
            None => Value::Float(float(x.to_f64().unwrap_or(0.0), y.to_f64().unwrap_or(0.0))),
        },
        Some(Operands::Float(x, y)) => Value::Float(float(x, y)),
        None => Value::Null,
    }
}

pub fn add(a: &Value, b: &Value) -> Value {
    exact_or_float(a, b, Decimal::checked_add, |x, y| x + y)
}

pub fn subtract(a: &Value, b: &Value) -> Value {
    exact_or_float(a, b, Decimal::checked_sub, |x, y| x - y)
}

pub fn multiply(a: &Value, b: &Value) -> Value {
    exact_or_float(a, b, Decimal::checked_mul, |x, y| x * y)
}

/// Divides to [`DIVISION_SCALE`] fractional digits, rounding half toward
/// zero. A zero divisor yields signed infinity.
pub fn divide(a: &Value, b: &Value) -> Value {
    match operands(a, b) {
        Some(Operands::Exact(x, y)) if !y.is_zero() => match x.checked_div(y) {
            Some(q) => Value::Number(
                q.round_dp_with_strategy(DIVISION_SCALE, RoundingStrategy::MidpointTowardZero)
                    .normalize(),
            ),
            None => float_divide(a.to_f64(), b.to_f64()),
        },
        Some(_) => float_divide(a.to_f64(), b.to_f64()),
        None => Value::Null,
    }
}

fn float_divide(x: f64, y: f64) -> Value {
    if y == 0.0 {
        return Value::Float(if x >= 0.0 { f64::INFINITY } else { f64::NEG_INFINITY });
    }
    Value::Float(x / y)
}

/// Floored modulo, `x - y * floor(x / y)`, always computed in `f64`.
pub fn modulo(a: &Value, b: &Value) -> Value {
    if !a.is_numeric() || !b.is_numeric() {
        return Value::Null;
    }
    let (x, y) = (a.to_f64(), b.to_f64());
    Value::Float(x - y * (x / y).floor())
}

pub fn negate(a: &Value) -> Value {
    match a {
        Value::Number(n) => Value::Number(-*n),
        Value::Float(f) => Value::Float(-*f),
        _ => Value::Null,
    }
}
