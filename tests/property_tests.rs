//! Property-based tests for parsing, comparison and arithmetic.
//!
//! Generated sources stay inside the grammar: unary operators apply to single
//! keys or literals and compound operands are always parenthesized, so every
//! generated string parses.

use std::cmp::Ordering;
use std::sync::Arc;

use keychain::compare::compare;
use keychain::{Expr, ParseCache, Value, try_parse};
use proptest::prelude::*;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_int() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..=1000).prop_map(|n| n.to_string()),
        (-1000i64..0).prop_map(|n| n.to_string()),
    ]
}

fn arb_float() -> impl Strategy<Value = String> {
    prop_oneof![
        (0.0f64..1000.0).prop_map(|f| format!("{:.2}", f)),
        (1.0f64..10.0, -5i32..5).prop_map(|(m, e)| format!("{:.1}e{}", m, e)),
    ]
}

fn arb_string() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_ ]{0,12}".prop_map(|s| format!("\"{}\"", s))
}

fn arb_ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}".prop_filter("keywords are not keys", |s| {
        !matches!(s.as_str(), "true" | "false" | "null")
    })
}

/// A segment after a dot: a key, or a grouped number literal.
fn arb_segment() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => arb_ident(),
        1 => arb_int().prop_map(|n| format!("({})", n)),
        1 => arb_float().prop_map(|f| format!("({})", f)),
    ]
}

/// A key, optionally indexed, followed by more segments.
fn arb_chain() -> impl Strategy<Value = String> {
    (arb_ident(), prop::option::of(0u32..5), prop::collection::vec(arb_segment(), 0..3)).prop_map(
        |(head, index, rest)| {
            let mut source = match index {
                Some(i) => format!("{}[{}]", head, i),
                None => head,
            };
            for part in rest {
                source.push('.');
                source.push_str(&part);
            }
            source
        },
    )
}

fn arb_binop() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("+"),
        Just("-"),
        Just("*"),
        Just("/"),
        Just("%"),
        Just("=="),
        Just("!="),
        Just("<"),
        Just(">"),
        Just("<="),
        Just(">="),
        Just("&&"),
        Just("||"),
    ]
}

fn arb_simple_expr() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_int(),
        arb_float(),
        arb_string(),
        Just("true".to_string()),
        Just("false".to_string()),
        Just("null".to_string()),
        arb_chain(),
        arb_chain().prop_map(|c| format!("!{}", c)),
        arb_chain().prop_map(|c| format!("-{}", c)),
    ]
}

fn arb_expr() -> impl Strategy<Value = String> {
    arb_simple_expr().prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            (inner.clone(), arb_binop(), inner.clone())
                .prop_map(|(l, op, r)| format!("({}) {} ({})", l, op, r)),
            (inner.clone(), inner.clone(), prop::option::of(inner.clone())).prop_map(
                |(c, t, e)| match e {
                    Some(e) => format!("({}) ? ({}) : ({})", c, t, e),
                    None => format!("({}) ? ({})", c, t),
                }
            ),
            (arb_ident(), prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(f, args)| format!("{}({})", f, args.join(", "))),
            (arb_ident(), inner).prop_map(|(a, i)| format!("{}[{}]", a, i)),
        ]
    })
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-1_000_000i64..1_000_000).prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
    ]
}

fn kind(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Boolean(_) => 1,
        Value::Number(_) => 2,
        _ => 3,
    }
}

fn parse_ok(source: &str) -> Expr {
    match try_parse(source) {
        Ok(expr) => expr,
        Err(e) => panic!("failed to parse {:?}: {}", source, e),
    }
}

// ============================================================================
// Parser properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn generated_sources_parse(source in arb_expr()) {
        prop_assert!(try_parse(&source).is_ok(), "failed on {:?}", source);
    }

    #[test]
    fn parse_is_deterministic(source in arb_expr()) {
        prop_assert_eq!(parse_ok(&source), parse_ok(&source));
    }

    #[test]
    fn rendering_reparses_to_same_tree(source in arb_expr()) {
        let expr = parse_ok(&source);
        let rendered = expr.to_string();
        prop_assert_eq!(parse_ok(&rendered), expr, "rendered as {:?}", rendered);
    }

    #[test]
    fn lexing_arbitrary_input_never_panics(source in "\\PC{0,40}") {
        let _ = try_parse(&source);
    }

    #[test]
    fn cache_is_idempotent(source in "\\PC{0,20}") {
        let cache = ParseCache::new();
        let first = cache.get_or_parse(&source);
        let second = cache.get_or_parse(&source);
        prop_assert!(Arc::ptr_eq(&first, &second));
        prop_assert_eq!(cache.len(), 1);
    }
}

// ============================================================================
// Comparison properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn compare_is_reflexive(v in arb_scalar()) {
        prop_assert_eq!(compare(&v, &v), Ordering::Equal);
    }

    #[test]
    fn compare_is_antisymmetric_within_a_kind(a in arb_scalar(), b in arb_scalar()) {
        prop_assume!(kind(&a) == kind(&b) || a.is_null() || b.is_null());
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
    }

    #[test]
    fn integers_compare_like_i64(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        prop_assert_eq!(compare(&Value::from(a), &Value::from(b)), a.cmp(&b));
    }

    #[test]
    fn strings_compare_ignoring_ascii_case(a in "[a-zA-Z]{0,8}", b in "[a-zA-Z]{0,8}") {
        let expected = a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase());
        prop_assert_eq!(compare(&Value::from(a.as_str()), &Value::from(b.as_str())), expected);
    }

    #[test]
    fn comparison_operators_agree_with_compare(a in arb_scalar(), b in arb_scalar()) {
        let doc = Value::map([("a", a.clone()), ("b", b.clone())]);
        let order = compare(&a, &b);
        prop_assert_eq!(keychain::value(&doc, "a == b"), Value::from(order == Ordering::Equal));
        prop_assert_eq!(keychain::value(&doc, "a != b"), Value::from(order != Ordering::Equal));
        prop_assert_eq!(keychain::value(&doc, "a < b"), Value::from(order == Ordering::Less));
        prop_assert_eq!(keychain::value(&doc, "a > b"), Value::from(order == Ordering::Greater));
    }
}

// ============================================================================
// Arithmetic properties
// ============================================================================

proptest! {
    #[test]
    fn integer_arithmetic_is_exact(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let doc = Value::map([("a", Value::from(a)), ("b", Value::from(b))]);
        prop_assert_eq!(keychain::value(&doc, "a + b"), Value::from(a + b));
        prop_assert_eq!(keychain::value(&doc, "a - b"), Value::from(a - b));
        prop_assert_eq!(keychain::value(&doc, "a * b"), Value::from(a * b));
    }

    #[test]
    fn negation_inverts_sign(a in -1_000_000i64..1_000_000) {
        let doc = Value::map([("a", Value::from(a))]);
        prop_assert_eq!(keychain::value(&doc, "-a"), Value::from(-a));
    }
}
