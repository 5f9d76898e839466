/// The closed set of node tags of a key chain.
///
/// Every [`Expr`](crate::ast::Expr) reports exactly one of these through
/// [`Expr::op`](crate::ast::Expr::op).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Literal,
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
    Negate,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    And,
    Or,
    Not,
    Key,
    ArrayIndex,
    FunctionCall,
    ArgList,
    Chain,
    Conditional,
    Assignment,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Floored modulo (`%`)
    Mod,

    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than (`<`)
    LessThan,
    /// Greater than or equal (`>=`)
    GreaterThanOrEqual,
    /// Less than or equal (`<=`)
    LessThanOrEqual,

    // Logical
    /// Logical AND (`&&`), both sides always evaluated
    And,
    /// Logical OR (`||`), both sides always evaluated
    Or,
}

impl BinOp {
    pub fn op(self) -> Op {
        match self {
            BinOp::Add => Op::Add,
            BinOp::Subtract => Op::Subtract,
            BinOp::Multiply => Op::Multiply,
            BinOp::Divide => Op::Divide,
            BinOp::Mod => Op::Mod,
            BinOp::Equal => Op::Equal,
            BinOp::NotEqual => Op::NotEqual,
            BinOp::GreaterThan => Op::GreaterThan,
            BinOp::LessThan => Op::LessThan,
            BinOp::GreaterThanOrEqual => Op::GreaterThanOrEqual,
            BinOp::LessThanOrEqual => Op::LessThanOrEqual,
            BinOp::And => Op::And,
            BinOp::Or => Op::Or,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Mod => "%",
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::GreaterThan => ">",
            BinOp::LessThan => "<",
            BinOp::GreaterThanOrEqual => ">=",
            BinOp::LessThanOrEqual => "<=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }

    /// Binding strength of the grammar level that produces this operator.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => Precedence::LOGICAL_OR,
            BinOp::And => Precedence::LOGICAL_AND,
            BinOp::Equal | BinOp::NotEqual => Precedence::EQUALITY,
            BinOp::GreaterThan
            | BinOp::LessThan
            | BinOp::GreaterThanOrEqual
            | BinOp::LessThanOrEqual => Precedence::COMPARATIVE,
            BinOp::Add | BinOp::Subtract => Precedence::ADDITIVE,
            BinOp::Multiply | BinOp::Divide | BinOp::Mod => Precedence::MULTIPLICATIVE,
        }
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() == Precedence::EQUALITY || self.precedence() == Precedence::COMPARATIVE
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Numeric negation (`-`)
    Negate,
    /// Boolean negation (`!`)
    Not,
}

impl UnaryOp {
    pub fn op(self) -> Op {
        match self {
            UnaryOp::Negate => Op::Negate,
            UnaryOp::Not => Op::Not,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Grammar levels, lowest binding first.
pub struct Precedence;

impl Precedence {
    pub const STATEMENT: u8 = 0;
    pub const CONDITIONAL: u8 = 1;
    pub const LOGICAL_OR: u8 = 2;
    pub const LOGICAL_AND: u8 = 3;
    pub const EQUALITY: u8 = 4;
    pub const COMPARATIVE: u8 = 5;
    pub const ADDITIVE: u8 = 6;
    pub const MULTIPLICATIVE: u8 = 7;
    pub const UNARY: u8 = 8;
    pub const CHAIN: u8 = 9;
    pub const PRIMARY: u8 = 10;
}
