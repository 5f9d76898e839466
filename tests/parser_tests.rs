// tests/parser_tests.rs

use keychain::ast::{BinOp, Expr, Literal, Op, UnaryOp};
use keychain::lexer::Lexer;
use keychain::parser::{ParseError, Parser};
use keychain::{last_error, parse, take_last_error, try_parse};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

fn parse_ok(source: &str) -> Expr {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer).unwrap();
    parser.parse().unwrap()
}

fn num(n: i64) -> Expr {
    Expr::number(n)
}

fn chain(names: &[&str]) -> Expr {
    Expr::Chain(names.iter().map(|n| Expr::key(*n)).collect())
}

// ============================================================================
// Precedence and associativity
// ============================================================================

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(
        parse_ok("1+2*3"),
        Expr::binary(BinOp::Add, num(1), Expr::binary(BinOp::Multiply, num(2), num(3)))
    );
}

#[test]
fn test_parentheses() {
    assert_eq!(
        parse_ok("(1 + 2) * 3"),
        Expr::binary(BinOp::Multiply, Expr::binary(BinOp::Add, num(1), num(2)), num(3))
    );
}

#[test]
fn test_left_associative_folding() {
    // Never right-leaning: 10-3-2 is (10-3)-2.
    assert_eq!(
        parse_ok("10-3-2"),
        Expr::binary(BinOp::Subtract, Expr::binary(BinOp::Subtract, num(10), num(3)), num(2))
    );
    assert_eq!(
        parse_ok("a || b || c"),
        Expr::binary(
            BinOp::Or,
            Expr::binary(BinOp::Or, Expr::key("a"), Expr::key("b")),
            Expr::key("c")
        )
    );
}

#[test]
fn test_precedence_ladder() {
    // || < && < equality < comparison < additive
    let expr = parse_ok("a || b && c == d < e + f");
    let expected = Expr::binary(
        BinOp::Or,
        Expr::key("a"),
        Expr::binary(
            BinOp::And,
            Expr::key("b"),
            Expr::binary(
                BinOp::Equal,
                Expr::key("c"),
                Expr::binary(
                    BinOp::LessThan,
                    Expr::key("d"),
                    Expr::binary(BinOp::Add, Expr::key("e"), Expr::key("f")),
                ),
            ),
        ),
    );
    assert_eq!(expr, expected);
}

#[test]
fn test_all_comparison_operators() {
    let cases = [
        ("a > b", BinOp::GreaterThan),
        ("a < b", BinOp::LessThan),
        ("a >= b", BinOp::GreaterThanOrEqual),
        ("a <= b", BinOp::LessThanOrEqual),
        ("a == b", BinOp::Equal),
        ("a != b", BinOp::NotEqual),
        ("a % b", BinOp::Mod),
        ("a / b", BinOp::Divide),
    ];
    for (source, op) in cases {
        assert_eq!(
            parse_ok(source),
            Expr::binary(op, Expr::key("a"), Expr::key("b")),
            "Failed for input: {}",
            source
        );
    }
}

// ============================================================================
// Unary, chains, index, call
// ============================================================================

#[test]
fn test_unary_applies_to_whole_chain() {
    assert_eq!(parse_ok("-a.b"), Expr::unary(UnaryOp::Negate, chain(&["a", "b"])));
    assert_eq!(parse_ok("!done"), Expr::unary(UnaryOp::Not, Expr::key("done")));
}

#[test]
fn test_unary_binds_tighter_than_multiplication() {
    assert_eq!(
        parse_ok("-a*b"),
        Expr::binary(
            BinOp::Multiply,
            Expr::unary(UnaryOp::Negate, Expr::key("a")),
            Expr::key("b")
        )
    );
}

#[test]
fn test_chain_is_flat() {
    let expr = parse_ok("a.b.c.d");
    assert_eq!(expr, chain(&["a", "b", "c", "d"]));
    assert_eq!(expr.op(), Op::Chain);
    assert_eq!(expr.child_count(), 4);
}

#[test]
fn test_single_key_is_not_a_chain() {
    assert_eq!(parse_ok("name"), Expr::key("name"));
}

#[test]
fn test_key_name_is_its_only_child() {
    let expr = parse_ok("name");
    assert_eq!(expr.op(), Op::Key);
    assert_eq!(expr.child_count(), 1);
    assert_eq!(expr.key_name(), Some("name"));
    assert!(expr.children().is_empty());
}

#[test]
fn test_grouped_chain_is_spliced() {
    assert_eq!(parse_ok("(a.b).c"), chain(&["a", "b", "c"]));
}

#[test]
fn test_array_index() {
    let expr = parse_ok("items[i + 1].price");
    let expected = Expr::Chain(vec![
        Expr::ArrayIndex {
            target: Box::new(Expr::key("items")),
            index: Box::new(Expr::binary(BinOp::Add, Expr::key("i"), num(1))),
        },
        Expr::key("price"),
    ]);
    assert_eq!(expr, expected);
    assert_eq!(expr.children()[0].op(), Op::ArrayIndex);
}

#[test]
fn test_function_call() {
    let expr = parse_ok("max(a, 2)");
    match &expr {
        Expr::FunctionCall { target, args } => {
            assert_eq!(**target, Expr::key("max"));
            assert_eq!(**args, Expr::ArgList(vec![Expr::key("a"), num(2)]));
        }
        other => panic!("expected function call, got {:?}", other),
    }
    assert_eq!(expr.op(), Op::FunctionCall);
}

#[test]
fn test_function_call_without_arguments() {
    let expr = parse_ok("now()");
    assert_eq!(
        expr,
        Expr::FunctionCall {
            target: Box::new(Expr::key("now")),
            args: Box::new(Expr::ArgList(Vec::new())),
        }
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_literals() {
    assert_eq!(parse_ok("'hi'"), Expr::string("hi"));
    assert_eq!(parse_ok("true"), Expr::boolean(true));
    assert_eq!(parse_ok("null"), Expr::null());
    assert_eq!(parse_ok("2.50"), Expr::Literal(Literal::Number(Decimal::new(250, 2))));
    assert!(parse_ok("null").is_null_literal());
    assert_eq!(parse_ok("'hi'").child_count(), 0);
}

// ============================================================================
// Conditionals and statements
// ============================================================================

#[test]
fn test_conditional() {
    assert_eq!(
        parse_ok("a ? 1 : 2"),
        Expr::Conditional {
            condition: Box::new(Expr::key("a")),
            then_branch: Box::new(num(1)),
            else_branch: Some(Box::new(num(2))),
        }
    );
    assert_eq!(parse_ok("a ? 1").child_count(), 2);
    assert_eq!(parse_ok("a ? 1 : 2").child_count(), 3);
}

#[test]
fn test_nested_conditional_in_else() {
    let expr = parse_ok("a ? 1 : b ? 2 : 3");
    match expr {
        Expr::Conditional { else_branch: Some(else_branch), .. } => {
            assert_eq!(else_branch.op(), Op::Conditional);
        }
        other => panic!("expected conditional, got {:?}", other),
    }
}

#[test]
fn test_assignment() {
    assert_eq!(parse_ok("x = 1 + 2"), Expr::assignment(Expr::key("x"), Expr::binary(BinOp::Add, num(1), num(2))));
}

#[test]
fn test_plus_assign_desugars() {
    assert_eq!(
        parse_ok("total += 5"),
        Expr::assignment(
            Expr::key("total"),
            Expr::binary(BinOp::Add, Expr::key("total"), num(5))
        )
    );
}

#[test]
fn test_assignment_to_path() {
    assert_eq!(
        parse_ok("order.total = 3"),
        Expr::assignment(chain(&["order", "total"]), num(3))
    );
}

#[test]
fn test_invalid_assignment_target() {
    assert!(matches!(
        try_parse("1 + a = 2"),
        Err(ParseError::InvalidAssignmentTarget { .. })
    ));
    assert!(matches!(
        try_parse("a[0] = 2"),
        Err(ParseError::InvalidAssignmentTarget { .. })
    ));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_syntax_errors() {
    for source in ["1 +", "(a", "a.", "a b", "? 1", "f(a,", "a[1", "1 = = 2"] {
        assert!(try_parse(source).is_err(), "expected an error for: {}", source);
    }
}

#[test]
fn test_unexpected_token_reports_position() {
    match try_parse("a + * b") {
        Err(ParseError::UnexpectedToken { found, position, .. }) => {
            assert_eq!(found, "*");
            assert_eq!(position.column, 5);
        }
        other => panic!("expected unexpected token, got {:?}", other),
    }
}

#[test]
fn test_empty_source_is_null() {
    assert_eq!(try_parse(""), Ok(Expr::null()));
    assert_eq!(try_parse("   "), Ok(Expr::null()));
}

#[test]
fn test_parse_never_fails() {
    let _ = take_last_error();
    let expr = parse("1 + (2");
    assert!(expr.is_null_literal());

    let error = last_error().expect("error recorded");
    assert!(error.starts_with("Error parsing keychain: @1 + (2@\n"), "{}", error);

    // Get-and-reset clears the slot.
    assert_eq!(take_last_error(), Some(error));
    assert_eq!(last_error(), None);
}

#[test]
fn test_parse_is_deterministic() {
    let source = "a.b[c + 1] * -d ? 'x' : f(1, 2)";
    assert_eq!(parse_ok(source), parse_ok(source));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_rendering_reparses_to_same_tree() {
    let sources = [
        "x.(5)",
        "(1).(2)",
        "a.(2.5).b",
        "items[0].(3)",
        "-a.b * (c + d)",
        "a ? (b ? 1) : 2",
        "10 - (3 - 2)",
    ];
    for source in sources {
        let expr = parse_ok(source);
        let rendered = expr.to_string();
        assert_eq!(parse_ok(&rendered), expr, "{} rendered as {}", source, rendered);
    }
}

#[test]
fn test_number_segment_is_not_read_as_float() {
    let expr = parse_ok("(1).(2)");
    assert_eq!(expr, Expr::Chain(vec![num(1), num(2)]));
    assert_eq!(expr.to_string(), "1.(2)");
}
