use std::fmt;
use std::mem;

use parking_lot::Mutex;

use crate::{
    ast::{BinOp, Expr, Literal, NodeBuilder, Token, UnaryOp},
    lexer::{LexError, Lexer, Position},
};

/// Errors raised while parsing key chain source text.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The lexer could not produce a token
    Lex(LexError),

    /// A token appeared where the grammar does not allow it
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
    },

    /// Left side of `=` / `+=` is not a key or a dotted path ending in a key
    InvalidAssignmentTarget { target: String, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::UnexpectedToken { position, .. }
            | ParseError::InvalidAssignmentTarget { position, .. } => *position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(e) => write!(f, "{}", e),
            ParseError::UnexpectedToken {
                expected,
                found,
                position,
            } => write!(f, "Expected {}, got {} at {}", expected, found, position),
            ParseError::InvalidAssignmentTarget { target, position } => write!(
                f,
                "Cannot assign to '{}' at {}: target must be a key or a dotted path ending in a key",
                target, position
            ),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current_token.describe(),
            position: self.lexer.token_position(),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.current_token != expected {
            return Err(self.unexpected(&format!("'{}'", expected.describe())));
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        &self.current_token == token
    }

    /// Parses a complete statement; all input must be consumed.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let statement = self.parse_statement()?;
        if !self.check(&Token::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(statement)
    }

    /// Statement := KeyChain ("=" | "+=") Expression | Expression
    pub fn parse_statement(&mut self) -> Result<Expr, ParseError> {
        let target_position = self.lexer.token_position();
        let expr = self.parse_expression()?;

        let accumulate = match self.current_token {
            Token::Assign => false,
            Token::PlusAssign => true,
            _ => return Ok(expr),
        };

        if !is_assignable(&expr) {
            return Err(ParseError::InvalidAssignmentTarget {
                target: expr.to_string(),
                position: target_position,
            });
        }

        self.advance()?;
        let value = self.parse_expression()?;
        let value = if accumulate {
            Expr::binary(BinOp::Add, expr.clone(), value)
        } else {
            value
        };
        Ok(Expr::assignment(expr, value))
    }

    /// Expression := LogicalOr ("?" Expression (":" Expression)?)?
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_logical_or()?;
        if !self.check(&Token::Question) {
            return Ok(condition);
        }

        self.advance()?;
        let then_branch = self.parse_expression()?;
        let else_branch = if self.check(&Token::Colon) {
            self.advance()?;
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    /// Folds `operand (op operand)*` into a left-leaning tree.
    fn parse_left_assoc(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
        operator: fn(&Token) -> Option<BinOp>,
    ) -> Result<Expr, ParseError> {
        let mut left = operand(self)?;

        while let Some(op) = operator(&self.current_token) {
            self.advance()?;
            let right = operand(self)?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_logical_and, |token| match token {
            Token::OrOr => Some(BinOp::Or),
            _ => None,
        })
    }

    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_equality, |token| match token {
            Token::AndAnd => Some(BinOp::And),
            _ => None,
        })
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_comparative, |token| match token {
            Token::EqEq => Some(BinOp::Equal),
            Token::NotEq => Some(BinOp::NotEqual),
            _ => None,
        })
    }

    fn parse_comparative(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_additive, |token| match token {
            Token::Gt => Some(BinOp::GreaterThan),
            Token::Lt => Some(BinOp::LessThan),
            Token::GtEq => Some(BinOp::GreaterThanOrEqual),
            Token::LtEq => Some(BinOp::LessThanOrEqual),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_multiplicative, |token| match token {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Subtract),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_unary, |token| match token {
            Token::Star => Some(BinOp::Multiply),
            Token::Slash => Some(BinOp::Divide),
            Token::Percent => Some(BinOp::Mod),
            _ => None,
        })
    }

    /// Unary := ("-" | "!")? KeyChain
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current_token {
            Token::Minus => UnaryOp::Negate,
            Token::Bang => UnaryOp::Not,
            _ => return self.parse_key_chain(),
        };
        self.advance()?;
        let operand = self.parse_key_chain()?;
        Ok(Expr::unary(op, operand))
    }

    /// KeyChain := Primary ("." Primary)*
    fn parse_key_chain(&mut self) -> Result<Expr, ParseError> {
        let mut chain = NodeBuilder::chain();
        chain.push(self.parse_primary()?);

        while self.check(&Token::Dot) {
            self.advance()?;
            chain.push(self.parse_primary()?);
        }
        Ok(chain.finish())
    }

    /// Parse primary expressions: keys (plain, indexed or called), literals, groups
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Key(name) => {
                self.advance()?;
                let key = Expr::Key(name);

                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = self.parse_arg_list()?;
                    self.expect(Token::RParen)?;
                    Ok(Expr::FunctionCall {
                        target: Box::new(key),
                        args: Box::new(args),
                    })
                } else if self.check(&Token::LBracket) {
                    self.advance()?;
                    let index = self.parse_expression()?;
                    self.expect(Token::RBracket)?;
                    Ok(Expr::ArrayIndex {
                        target: Box::new(key),
                        index: Box::new(index),
                    })
                } else {
                    Ok(key)
                }
            }

            // Literals
            Token::Int(n) | Token::Float(n) => {
                self.advance()?;
                Ok(Expr::Literal(Literal::Number(n)))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Expr::Literal(Literal::String(s)))
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Expr::Literal(Literal::Boolean(b)))
            }
            Token::Null => {
                self.advance()?;
                Ok(Expr::null())
            }

            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }

            token => {
                self.current_token = token;
                Err(self.unexpected("key, number, string or '('"))
            }
        }
    }

    /// ArgList := Expression ("," Expression)*, possibly empty
    fn parse_arg_list(&mut self) -> Result<Expr, ParseError> {
        let mut args = NodeBuilder::arg_list();
        if self.check(&Token::RParen) {
            return Ok(args.finish());
        }

        args.push(self.parse_expression()?);
        while self.check(&Token::Comma) {
            self.advance()?;
            args.push(self.parse_expression()?);
        }
        Ok(args.finish())
    }
}

/// Whether `expr` may appear on the left of `=`.
fn is_assignable(expr: &Expr) -> bool {
    match expr {
        Expr::Key(_) => true,
        Expr::Chain(parts) => matches!(parts.last(), Some(Expr::Key(_))),
        _ => false,
    }
}

/// Message of the most recent failed [`parse`].
static LAST_ERROR: Mutex<Option<String>> = parking_lot::const_mutex(None);

/// Parses `source`, returning the error instead of recording it.
pub fn try_parse(source: &str) -> Result<Expr, ParseError> {
    if source.trim().is_empty() {
        return Ok(Expr::null());
    }
    Parser::new(Lexer::new(source))?.parse()
}

/// Parses `source`. Never fails: on a syntax error the degenerate `null`
/// literal is returned and the error is kept for [`last_error`].
pub fn parse(source: &str) -> Expr {
    match try_parse(source) {
        Ok(expr) => expr,
        Err(e) => {
            tracing::debug!(source, error = %e, "failed to parse key chain");
            *LAST_ERROR.lock() = Some(format!("Error parsing keychain: @{}@\n{}", source, e));
            Expr::null()
        }
    }
}

/// The error recorded by the last failed [`parse`], if any.
pub fn last_error() -> Option<String> {
    LAST_ERROR.lock().clone()
}

/// Returns and clears the recorded parse error.
pub fn take_last_error() -> Option<String> {
    LAST_ERROR.lock().take()
}
