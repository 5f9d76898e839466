//! Tokenizer for key chain source text.
//!
//! Tokens are matched by a table of anchored regular expressions; the longest
//! match wins and a fixed symbol beats a pattern of the same length. String
//! literals are lexed in two steps: the opening quote switches the lexer into
//! string-body mode, where a dedicated pattern consumes everything up to the
//! next unescaped matching quote.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::ast::Token;

/// Location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset into the input
    pub offset: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column (in characters)
    pub column: usize,
}

impl Position {
    pub fn from_offset(input: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for ch in input[..offset.min(input.len())].chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Position {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors raised while splitting the input into tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// No token pattern matches at this position
    UnexpectedChar { found: String, position: Position },

    /// Opening quote without a closing one
    UnterminatedString { position: Position },

    /// Numeric literal outside the decimal range
    InvalidNumber { text: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedChar { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::InvalidNumber { position, .. } => *position,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedChar { found, position } => {
                write!(f, "Token not found for: {} at {}", found, position)
            }
            LexError::UnterminatedString { position } => {
                write!(f, "Unterminated string starting at {}", position)
            }
            LexError::InvalidNumber { text, position } => {
                write!(f, "Number out of range: {} at {}", text, position)
            }
        }
    }
}

impl std::error::Error for LexError {}

#[derive(Debug, Clone)]
enum Kind {
    Key,
    Int,
    Float,
    StringStart(char),
    Symbol(Token),
}

struct Rule {
    kind: Kind,
    regex: Regex,
    literal: bool,
}

const SYMBOLS: &[(&str, Token)] = &[
    ("+=", Token::PlusAssign),
    ("||", Token::OrOr),
    ("&&", Token::AndAnd),
    ("==", Token::EqEq),
    ("!=", Token::NotEq),
    ("<=", Token::LtEq),
    (">=", Token::GtEq),
    ("=", Token::Assign),
    ("?", Token::Question),
    (":", Token::Colon),
    ("!", Token::Bang),
    ("<", Token::Lt),
    (">", Token::Gt),
    ("+", Token::Plus),
    ("-", Token::Minus),
    ("*", Token::Star),
    ("/", Token::Slash),
    ("%", Token::Percent),
    (".", Token::Dot),
    (",", Token::Comma),
    ("(", Token::LParen),
    (")", Token::RParen),
    ("[", Token::LBracket),
    ("]", Token::RBracket),
];

fn anchored(pattern: &str) -> Regex {
    // The table below is fixed; a bad pattern is a programming error.
    Regex::new(&format!("^(?:{pattern})")).expect("token pattern must compile")
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let mut rules = vec![
        Rule {
            kind: Kind::Key,
            regex: anchored(r"[\p{L}_$][\p{L}\p{N}_$]*"),
            literal: false,
        },
        Rule {
            kind: Kind::Int,
            regex: anchored(r"[0-9]+"),
            literal: false,
        },
        Rule {
            kind: Kind::Float,
            regex: anchored(r"[0-9]*\.[0-9]+(?:[eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+"),
            literal: false,
        },
        Rule {
            kind: Kind::StringStart('"'),
            regex: anchored("\""),
            literal: true,
        },
        Rule {
            kind: Kind::StringStart('\''),
            regex: anchored("'"),
            literal: true,
        },
    ];
    rules.extend(SYMBOLS.iter().map(|(text, token)| Rule {
        kind: Kind::Symbol(token.clone()),
        regex: anchored(&regex::escape(text)),
        literal: true,
    }));
    rules
});

/// String body up to (not including) the next unescaped quote.
static DOUBLE_QUOTED_BODY: LazyLock<Regex> =
    LazyLock::new(|| anchored(r#"(?s)(?:[^"\\]|\\.)*?""#));
static SINGLE_QUOTED_BODY: LazyLock<Regex> =
    LazyLock::new(|| anchored(r"(?s)(?:[^'\\]|\\.)*?'"));

pub struct Lexer {
    input: String,
    position: usize,
    token_start: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.to_string(),
            position: 0,
            token_start: 0,
        }
    }

    /// Source text being tokenized.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Where the most recently returned token started.
    pub fn token_position(&self) -> Position {
        Position::from_offset(&self.input, self.token_start)
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.position..];
        let trimmed = rest.trim_start();
        self.position += rest.len() - trimmed.len();
    }

    /// Picks the longest matching rule at the current position.
    fn best_match(&self) -> Option<(&'static Rule, usize)> {
        let rest = &self.input[self.position..];
        let mut best: Option<(&'static Rule, usize)> = None;

        for rule in RULES.iter() {
            let Some(m) = rule.regex.find(rest) else {
                continue;
            };
            let len = m.end();
            if len == 0 {
                continue;
            }
            best = match best {
                Some((current, current_len))
                    if current_len > len || (current_len == len && (current.literal || !rule.literal)) =>
                {
                    Some((current, current_len))
                }
                _ => Some((rule, len)),
            };
        }
        best
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.position;

        if self.position >= self.input.len() {
            return Ok(Token::Eof);
        }

        let Some((rule, len)) = self.best_match() else {
            let found: String = self.input[self.position..].chars().take(30).collect();
            return Err(LexError::UnexpectedChar {
                found,
                position: self.token_position(),
            });
        };

        let text = self.input[self.position..self.position + len].to_string();
        self.position += len;

        match &rule.kind {
            Kind::Key => Ok(match text.as_str() {
                "true" => Token::Boolean(true),
                "false" => Token::Boolean(false),
                "null" => Token::Null,
                _ => Token::Key(text),
            }),
            Kind::Int => self.parse_number(&text).map(Token::Int),
            Kind::Float => self.parse_number(&text).map(Token::Float),
            Kind::StringStart(quote) => self.read_string_body(*quote).map(Token::String),
            Kind::Symbol(token) => Ok(token.clone()),
        }
    }

    fn parse_number(&self, text: &str) -> Result<Decimal, LexError> {
        let normalized = if text.starts_with('.') {
            format!("0{text}")
        } else {
            text.to_ascii_lowercase()
        };
        let parsed = if normalized.contains('e') {
            Decimal::from_scientific(&normalized)
        } else {
            Decimal::from_str(&normalized)
        };
        parsed.map_err(|_| LexError::InvalidNumber {
            text: text.to_string(),
            position: self.token_position(),
        })
    }

    /// Consumes a string body after its opening quote (string-body mode).
    fn read_string_body(&mut self, quote: char) -> Result<String, LexError> {
        let body = if quote == '"' {
            &DOUBLE_QUOTED_BODY
        } else {
            &SINGLE_QUOTED_BODY
        };
        let rest = &self.input[self.position..];
        let Some(m) = body.find(rest) else {
            return Err(LexError::UnterminatedString {
                position: self.token_position(),
            });
        };
        // Drop the closing quote.
        let raw = &rest[..m.end() - quote.len_utf8()];
        let content = unescape(raw);
        self.position += m.end();
        Ok(content)
    }

    /// Tokenizes the remaining input, `Eof` included.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

fn unescape(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('/') => result.push('/'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('\\') => result.push('\\'),
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            // Unknown escapes are kept as written.
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("true false null nullable");
    assert_eq!(lexer.next_token(), Ok(Token::Boolean(true)));
    assert_eq!(lexer.next_token(), Ok(Token::Boolean(false)));
    assert_eq!(lexer.next_token(), Ok(Token::Null));
    assert_eq!(lexer.next_token(), Ok(Token::Key("nullable".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_longest_match() {
    let mut lexer = Lexer::new("a+=1.5>=b");
    assert_eq!(lexer.next_token(), Ok(Token::Key("a".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::PlusAssign));
    assert_eq!(lexer.next_token(), Ok(Token::Float(Decimal::new(15, 1))));
    assert_eq!(lexer.next_token(), Ok(Token::GtEq));
    assert_eq!(lexer.next_token(), Ok(Token::Key("b".to_string())));
}

#[test]
fn test_string_body_mode() {
    // Operators inside a string are content, not tokens.
    let mut lexer = Lexer::new(r#""a + b" == 'x'"#);
    assert_eq!(lexer.next_token(), Ok(Token::String("a + b".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::EqEq));
    assert_eq!(lexer.next_token(), Ok(Token::String("x".to_string())));
}
