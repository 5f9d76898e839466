use rust_decimal::Decimal;

use crate::ast::{BinOp, Op, UnaryOp};

/// Scalar payload of a literal node.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `null`, also the degenerate tree returned for unparsable input
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// Numeric literal, exact as written
    Number(Decimal),
    /// String literal without its quotes
    String(String),
}

/// A parsed key chain: one node of the expression tree.
///
/// Trees are built by the parser and never change afterwards, so a parsed
/// tree can be shared between threads and evaluated any number of times.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    ///
    /// # Examples
    /// ```text
    /// 42
    /// "hello"
    /// true
    /// ```
    Literal(Literal),

    /// Name looked up on the current object, then in the variable scope
    ///
    /// # Example
    /// ```text
    /// Revenue
    /// ```
    Key(String),

    /// Prefix operation (`-x`, `!x`)
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Binary operation (arithmetic, comparison, logical)
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Element of a list-valued key
    ///
    /// # Example
    /// ```text
    /// items[2]
    /// ```
    ArrayIndex { target: Box<Expr>, index: Box<Expr> },

    /// Function call; parsed but not evaluated
    ///
    /// # Example
    /// ```text
    /// max(a, b)
    /// ```
    FunctionCall { target: Box<Expr>, args: Box<Expr> },

    /// Comma separated call arguments (possibly empty)
    ArgList(Vec<Expr>),

    /// Dotted path, each segment evaluated against the previous result
    ///
    /// # Example
    /// ```text
    /// customer.address.city
    /// ```
    Chain(Vec<Expr>),

    /// `condition ? then : else`, the else branch being optional
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },

    /// `target = value`; `target += value` is stored as `target = target + value`
    Assignment { target: Box<Expr>, value: Box<Expr> },
}

impl Expr {
    /// The degenerate `null` literal.
    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn key(name: impl Into<String>) -> Self {
        Expr::Key(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn number(value: impl Into<Decimal>) -> Self {
        Expr::Literal(Literal::Number(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Expr::Literal(Literal::Boolean(value))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn assignment(target: Expr, value: Expr) -> Self {
        Expr::Assignment {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// The node's tag.
    pub fn op(&self) -> Op {
        match self {
            Expr::Literal(_) => Op::Literal,
            Expr::Key(_) => Op::Key,
            Expr::Unary { op, .. } => op.op(),
            Expr::Binary { op, .. } => op.op(),
            Expr::ArrayIndex { .. } => Op::ArrayIndex,
            Expr::FunctionCall { .. } => Op::FunctionCall,
            Expr::ArgList(_) => Op::ArgList,
            Expr::Chain(_) => Op::Chain,
            Expr::Conditional { .. } => Op::Conditional,
            Expr::Assignment { .. } => Op::Assignment,
        }
    }

    /// Child nodes in source order. Literals have none. A key's single
    /// child is its name, held inline and read with [`Expr::key_name`], so
    /// it is not listed here.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Literal(_) | Expr::Key(_) => Vec::new(),
            Expr::Unary { operand, .. } => vec![operand.as_ref()],
            Expr::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expr::ArrayIndex { target, index } => vec![target.as_ref(), index.as_ref()],
            Expr::FunctionCall { target, args } => vec![target.as_ref(), args.as_ref()],
            Expr::ArgList(items) | Expr::Chain(items) => items.iter().collect(),
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut children = vec![condition.as_ref(), then_branch.as_ref()];
                if let Some(else_branch) = else_branch {
                    children.push(else_branch.as_ref());
                }
                children
            }
            Expr::Assignment { target, value } => vec![target.as_ref(), value.as_ref()],
        }
    }

    /// Number of children, a key's name included.
    pub fn child_count(&self) -> usize {
        match self {
            Expr::Key(_) => 1,
            _ => self.children().len(),
        }
    }

    /// Name of a `Key` node.
    pub fn key_name(&self) -> Option<&str> {
        match self {
            Expr::Key(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self, Expr::Literal(Literal::Null))
    }
}

/// Accumulates the operands of a left-associative n-ary production
/// (`Chain`, `ArgList`) and freezes them into a node.
#[derive(Debug)]
pub(crate) struct NodeBuilder {
    op: Op,
    children: Vec<Expr>,
}

impl NodeBuilder {
    pub(crate) fn chain() -> Self {
        NodeBuilder {
            op: Op::Chain,
            children: Vec::new(),
        }
    }

    pub(crate) fn arg_list() -> Self {
        NodeBuilder {
            op: Op::ArgList,
            children: Vec::new(),
        }
    }

    /// Appends an operand. A chain operand that is itself a chain
    /// (`(a.b).c`) is spliced in rather than nested.
    pub(crate) fn push(&mut self, child: Expr) {
        match child {
            Expr::Chain(parts) if self.op == Op::Chain => self.children.extend(parts),
            other => self.children.push(other),
        }
    }

    /// Freezes the node. A chain with a single segment is just that segment.
    pub(crate) fn finish(mut self) -> Expr {
        match self.op {
            Op::Chain if self.children.len() == 1 => self.children.remove(0),
            Op::Chain => Expr::Chain(self.children),
            _ => Expr::ArgList(self.children),
        }
    }
}
