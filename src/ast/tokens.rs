use rust_decimal::Decimal;

/// Lexical tokens of the key chain language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Integer literal, kept as an exact decimal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 007
    /// ```
    Int(Decimal),

    /// Fractional or exponent literal, kept as an exact decimal
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// .5
    /// 1e3
    /// ```
    Float(Decimal),

    /// String literal with its quotes stripped and escapes resolved
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'http:\/\/example.com'
    /// ```
    String(String),

    /// `true` or `false`
    Boolean(bool),

    /// `null`
    Null,

    /// Key name
    ///
    /// Starts with a letter, `_` or `$`, followed by letters, digits, `_` or `$`.
    ///
    /// # Examples
    /// ```text
    /// name
    /// Revenue
    /// _count
    /// ```
    Key(String),

    // Assignment
    /// `=`
    Assign,
    /// `+=`
    PlusAssign,

    // Conditional
    /// `?`
    Question,
    /// `:`
    Colon,

    // Logical
    /// `||`
    OrOr,
    /// `&&`
    AndAnd,
    /// `!`
    Bang,

    // Comparison
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,

    // Arithmetic
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,

    // Delimiters
    /// `.` between key chain segments
    Dot,
    /// `,` between function arguments
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,

    /// End of input
    Eof,
}

impl Token {
    /// Source spelling of the token, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Int(n) | Token::Float(n) => n.to_string(),
            Token::String(s) => format!("\"{s}\""),
            Token::Boolean(b) => b.to_string(),
            Token::Null => "null".to_string(),
            Token::Key(k) => k.clone(),
            Token::Eof => "end of input".to_string(),
            other => other.symbol().to_string(),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::Assign => "=",
            Token::PlusAssign => "+=",
            Token::Question => "?",
            Token::Colon => ":",
            Token::OrOr => "||",
            Token::AndAnd => "&&",
            Token::Bang => "!",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::LtEq => "<=",
            Token::GtEq => ">=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Dot => ".",
            Token::Comma => ",",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            _ => "",
        }
    }
}
