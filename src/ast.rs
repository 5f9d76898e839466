//! # Key Chain Language - Abstract Syntax Tree
//!
//! A key chain is a small expression evaluated against an object graph:
//! names are looked up on a "current" object, dotted paths walk from object
//! to object, and the usual arithmetic, comparison, logical and conditional
//! operators combine the results.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Node tags, binary and unary operators, precedence levels
//! - **[expressions]** - The expression tree itself
//! - **[display]** - Rendering a tree back to source text
//!
//! ## Grammar
//!
//! ```text
//! Statement      := KeyChain ("=" | "+=") Expression | Expression
//! Expression     := LogicalOr ("?" Expression (":" Expression)?)?
//! LogicalOr      := LogicalAnd ("||" LogicalAnd)*
//! LogicalAnd     := Equality ("&&" Equality)*
//! Equality       := Comparative (("==" | "!=") Comparative)*
//! Comparative    := Additive ((">" | "<" | ">=" | "<=") Additive)*
//! Additive       := Multiplicative (("+" | "-") Multiplicative)*
//! Multiplicative := Unary (("*" | "/" | "%") Unary)*
//! Unary          := ("-" | "!")? KeyChain
//! KeyChain       := Primary ("." Primary)*
//! Primary        := KEY "(" ArgList? ")" | KEY "[" Expression "]" | KEY
//!                 | INT | FLOAT | STRING | "true" | "false" | "null"
//!                 | "(" Expression ")"
//! ArgList        := Expression ("," Expression)*
//! ```
//!
//! ## Examples
//!
//! ```text
//! Revenue * 1.1
//! customer.address.city
//! items[0].price > 100 ? "big" : "small"
//! total += line.amount
//! ```
pub mod display;
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::Literal;
pub use expressions::Expr;
pub(crate) use expressions::NodeBuilder;
pub use operators::{BinOp, Op, Precedence, UnaryOp};
pub use tokens::Token;
