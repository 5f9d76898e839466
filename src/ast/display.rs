//! Rendering key chains back to source text.
//!
//! Output re-parses to a structurally equal tree: parentheses are added only
//! where a child binds more loosely than its position in the grammar allows.

use std::fmt::{self, Display, Formatter};

use crate::ast::{BinOp, Expr, Literal, Precedence};

impl Expr {
    /// Binding strength of the grammar level this node is produced at.
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Literal(_)
            | Expr::Key(_)
            | Expr::ArrayIndex { .. }
            | Expr::FunctionCall { .. }
            | Expr::ArgList(_) => Precedence::PRIMARY,
            Expr::Chain(_) => Precedence::CHAIN,
            Expr::Unary { .. } => Precedence::UNARY,
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Conditional { .. } => Precedence::CONDITIONAL,
            Expr::Assignment { .. } => Precedence::STATEMENT,
        }
    }
}

/// Writes `expr`, parenthesized when it binds more loosely than `min`.
fn write_at(f: &mut Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if expr.precedence() < min {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn write_literal(f: &mut Formatter<'_>, literal: &Literal) -> fmt::Result {
    match literal {
        Literal::Null => f.write_str("null"),
        Literal::Boolean(b) => write!(f, "{b}"),
        Literal::Number(n) => write!(f, "{n}"),
        Literal::String(s) => {
            f.write_str("\"")?;
            for ch in s.chars() {
                match ch {
                    '"' => f.write_str("\\\"")?,
                    '\\' => f.write_str("\\\\")?,
                    '\n' => f.write_str("\\n")?,
                    '\t' => f.write_str("\\t")?,
                    '\r' => f.write_str("\\r")?,
                    c => write!(f, "{c}")?,
                }
            }
            f.write_str("\"")
        }
    }
}

fn binary_spacing(op: BinOp) -> &'static str {
    match op {
        BinOp::And | BinOp::Or => " ",
        _ => "",
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(literal) => write_literal(f, literal),
            Expr::Key(name) => f.write_str(name),
            Expr::Unary { op, operand } => {
                f.write_str(op.symbol())?;
                write_at(f, operand, Precedence::CHAIN)
            }
            Expr::Binary { op, left, right } => {
                let level = op.precedence();
                let space = binary_spacing(*op);
                write_at(f, left, level)?;
                write!(f, "{space}{}{space}", op.symbol())?;
                // Left-associative: an equal-level right operand needs grouping.
                write_at(f, right, level + 1)
            }
            Expr::ArrayIndex { target, index } => {
                write_at(f, target, Precedence::PRIMARY)?;
                f.write_str("[")?;
                write_at(f, index, Precedence::CONDITIONAL)?;
                f.write_str("]")
            }
            Expr::FunctionCall { target, args } => {
                write_at(f, target, Precedence::PRIMARY)?;
                write!(f, "({args})")
            }
            Expr::ArgList(args) => {
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_at(f, arg, Precedence::CONDITIONAL)?;
                }
                Ok(())
            }
            Expr::Chain(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i == 0 {
                        write_at(f, part, Precedence::PRIMARY)?;
                        continue;
                    }
                    f.write_str(".")?;
                    // `.5` would lex as a float
                    if let Expr::Literal(Literal::Number(_)) = part {
                        write!(f, "({part})")?;
                    } else {
                        write_at(f, part, Precedence::PRIMARY)?;
                    }
                }
                Ok(())
            }
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                write_at(f, condition, Precedence::LOGICAL_OR)?;
                f.write_str("?")?;
                // `a?(b?c):d` must not turn into `a?b?c:d`
                write_at(f, then_branch, Precedence::LOGICAL_OR)?;
                if let Some(else_branch) = else_branch {
                    f.write_str(":")?;
                    write_at(f, else_branch, Precedence::CONDITIONAL)?;
                }
                Ok(())
            }
            Expr::Assignment { target, value } => {
                write!(f, "{target} = ")?;
                write_at(f, value, Precedence::CONDITIONAL)
            }
        }
    }
}
