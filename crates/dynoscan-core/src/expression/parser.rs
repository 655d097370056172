//! Lexer and recursive-descent parser for the filter/key-condition DSL.
//!
//! The grammar is a subset of DynamoDB condition syntax with literals
//! written inline: comparisons (`path op literal`), `BETWEEN`, `IN`,
//! function predicates, and `AND`/`OR`/`NOT` connectives. Keywords are
//! uppercase and function names lowercase; both are matched exactly.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use super::ast::{AttributePath, CompareOp, Expr, FunctionName, Literal, LogicalOp, PathElement};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced during expression parsing.
#[derive(Debug, thiserror::Error)]
pub enum ExpressionError {
    /// An unexpected token was encountered.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },
    /// The expression ended prematurely.
    #[error("unexpected end of expression")]
    UnexpectedEof,
    /// An identifier was called like a function but is not a known function.
    #[error("unknown function: {name}")]
    UnknownFunction {
        /// The offending identifier.
        name: String,
    },
    /// A literal token could not be read.
    #[error("malformed literal: {fragment}")]
    MalformedLiteral {
        /// The offending fragment.
        fragment: String,
    },
}

// ---------------------------------------------------------------------------
// Token type
// ---------------------------------------------------------------------------

/// Lexer token for expression strings.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// A plain identifier (attribute name).
    Identifier(String),
    /// A single-quoted string literal.
    StringLit(String),
    /// A decimal number literal (string-encoded).
    NumberLit(String),
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `AND`
    And,
    /// `OR`
    Or,
    /// `NOT`
    Not,
    /// `BETWEEN`
    Between,
    /// `IN`
    In,
    /// `attribute_exists`
    AttributeExists,
    /// `attribute_not_exists`
    AttributeNotExists,
    /// `begins_with`
    BeginsWith,
    /// `contains`
    Contains,
    /// End of input.
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(s) => write!(f, "identifier '{s}'"),
            Self::StringLit(s) => write!(f, "string '{s}'"),
            Self::NumberLit(s) => write!(f, "number {s}"),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Null => write!(f, "null"),
            Self::Eq => write!(f, "'='"),
            Self::Ne => write!(f, "'<>'"),
            Self::Lt => write!(f, "'<'"),
            Self::Le => write!(f, "'<='"),
            Self::Gt => write!(f, "'>'"),
            Self::Ge => write!(f, "'>='"),
            Self::Dot => write!(f, "'.'"),
            Self::Comma => write!(f, "','"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::LBracket => write!(f, "'['"),
            Self::RBracket => write!(f, "']'"),
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::Not => write!(f, "NOT"),
            Self::Between => write!(f, "BETWEEN"),
            Self::In => write!(f, "IN"),
            Self::AttributeExists => write!(f, "attribute_exists"),
            Self::AttributeNotExists => write!(f, "attribute_not_exists"),
            Self::BeginsWith => write!(f, "begins_with"),
            Self::Contains => write!(f, "contains"),
            Self::Eof => write!(f, "EOF"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

/// Tokenizer for expression strings.
struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    /// Tokenize the entire input into a vector of tokens.
    fn tokenize(&mut self) -> Result<Vec<Token>, ExpressionError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            if tok == Token::Eof {
                tokens.push(Token::Eof);
                break;
            }
            tokens.push(tok);
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(char::is_ascii_whitespace) {
            self.chars.next();
        }
    }

    fn next_token(&mut self) -> Result<Token, ExpressionError> {
        self.skip_whitespace();

        let Some(&ch) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        match ch {
            '\'' => self.read_string(),
            '=' => {
                self.chars.next();
                Ok(Token::Eq)
            }
            '<' => Ok(self.read_lt_family()),
            '>' => Ok(self.read_gt_family()),
            '.' => {
                self.chars.next();
                Ok(Token::Dot)
            }
            ',' => {
                self.chars.next();
                Ok(Token::Comma)
            }
            '(' => {
                self.chars.next();
                Ok(Token::LParen)
            }
            ')' => {
                self.chars.next();
                Ok(Token::RParen)
            }
            '[' => {
                self.chars.next();
                Ok(Token::LBracket)
            }
            ']' => {
                self.chars.next();
                Ok(Token::RBracket)
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' => self.read_number(),
            c if is_ident_start(c) => Ok(self.read_identifier_or_keyword()),
            _ => Err(ExpressionError::UnexpectedToken {
                expected: "valid token".to_owned(),
                found: format!("'{ch}'"),
            }),
        }
    }

    /// Read a single-quoted string; `''` inside the quotes is an escaped quote.
    fn read_string(&mut self) -> Result<Token, ExpressionError> {
        self.chars.next(); // consume opening quote
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some('\'') => {
                    if self.chars.peek() == Some(&'\'') {
                        self.chars.next();
                        s.push('\'');
                    } else {
                        return Ok(Token::StringLit(s));
                    }
                }
                Some(c) => s.push(c),
                None => {
                    return Err(ExpressionError::MalformedLiteral {
                        fragment: format!("unterminated string '{s}"),
                    });
                }
            }
        }
    }

    fn read_lt_family(&mut self) -> Token {
        self.chars.next(); // consume '<'
        if self.chars.peek() == Some(&'=') {
            self.chars.next();
            Token::Le
        } else if self.chars.peek() == Some(&'>') {
            self.chars.next();
            Token::Ne
        } else {
            Token::Lt
        }
    }

    fn read_gt_family(&mut self) -> Token {
        self.chars.next(); // consume '>'
        if self.chars.peek() == Some(&'=') {
            self.chars.next();
            Token::Ge
        } else {
            Token::Gt
        }
    }

    /// Read a decimal number with optional sign, fraction, and exponent.
    fn read_number(&mut self) -> Result<Token, ExpressionError> {
        let mut s = String::new();
        if matches!(self.chars.peek(), Some('-' | '+')) {
            s.push(self.chars.next().unwrap_or_default());
        }
        let mut int_digits = 0;
        while self.chars.peek().is_some_and(char::is_ascii_digit) {
            s.push(self.chars.next().unwrap_or_default());
            int_digits += 1;
        }
        if int_digits == 0 {
            return Err(ExpressionError::MalformedLiteral {
                fragment: format!("'{s}' is not a number"),
            });
        }
        if self.chars.peek() == Some(&'.') {
            s.push('.');
            self.chars.next();
            let mut frac_digits = 0;
            while self.chars.peek().is_some_and(char::is_ascii_digit) {
                s.push(self.chars.next().unwrap_or_default());
                frac_digits += 1;
            }
            if frac_digits == 0 {
                return Err(ExpressionError::MalformedLiteral {
                    fragment: format!("'{s}' has an empty fraction"),
                });
            }
        }
        if matches!(self.chars.peek(), Some('e' | 'E')) {
            s.push(self.chars.next().unwrap_or_default());
            if matches!(self.chars.peek(), Some('-' | '+')) {
                s.push(self.chars.next().unwrap_or_default());
            }
            let mut exp_digits = 0;
            while self.chars.peek().is_some_and(char::is_ascii_digit) {
                s.push(self.chars.next().unwrap_or_default());
                exp_digits += 1;
            }
            if exp_digits == 0 {
                return Err(ExpressionError::MalformedLiteral {
                    fragment: format!("'{s}' has an empty exponent"),
                });
            }
        }
        Ok(Token::NumberLit(s))
    }

    fn read_ident_chars(&mut self) -> String {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if is_ident_continue(c) {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    /// Keywords and function names are matched exactly: connectives are
    /// uppercase, functions and `true`/`false`/`null` lowercase. Anything
    /// else is an attribute name.
    fn read_identifier_or_keyword(&mut self) -> Token {
        let ident = self.read_ident_chars();
        match ident.as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            "BETWEEN" => Token::Between,
            "IN" => Token::In,
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            "attribute_exists" => Token::AttributeExists,
            "attribute_not_exists" => Token::AttributeNotExists,
            "begins_with" => Token::BeginsWith,
            "contains" => Token::Contains,
            _ => Token::Identifier(ident),
        }
    }
}

/// Returns `true` if `c` can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Returns `true` if `c` can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Recursive-descent parser over the token stream.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<Token, ExpressionError> {
        let tok = self.advance();
        if std::mem::discriminant(&tok) == std::mem::discriminant(expected) {
            Ok(tok)
        } else {
            Err(ExpressionError::UnexpectedToken {
                expected: expected.to_string(),
                found: tok.to_string(),
            })
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }
}

// ---------------------------------------------------------------------------
// Predicate parsing (precedence climbing)
// ---------------------------------------------------------------------------

impl Parser {
    /// Parse a full predicate (OR is lowest precedence).
    fn parse_or_expr(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_and_expr()?;
        while matches!(self.peek(), Token::Or) {
            self.advance();
            let right = self.parse_and_expr()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_not_expr()?;
        while matches!(self.peek(), Token::And) {
            self.advance();
            let right = self.parse_not_expr()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not_expr(&mut self) -> Result<Expr, ExpressionError> {
        if matches!(self.peek(), Token::Not) {
            self.advance();
            let expr = self.parse_not_expr()?;
            return Ok(Expr::Not(Box::new(expr)));
        }
        self.parse_primary_expr()
    }

    /// Parse primary predicates: comparisons, BETWEEN, IN, functions, and
    /// parenthesized groups.
    fn parse_primary_expr(&mut self) -> Result<Expr, ExpressionError> {
        if matches!(self.peek(), Token::LParen) {
            self.advance();
            let expr = self.parse_or_expr()?;
            self.expect(&Token::RParen)?;
            return Ok(expr);
        }

        if let Some(func_name) = self.peek_function_name() {
            return self.parse_function_expr(func_name);
        }

        // An identifier followed by `(` would be a function call, but only
        // the four known function names are callable.
        if let (Token::Identifier(name), Some(Token::LParen)) =
            (self.peek().clone(), self.tokens.get(self.pos + 1))
        {
            return Err(ExpressionError::UnknownFunction { name });
        }

        let path = self.parse_attribute_path()?;
        self.parse_postfix_expr(path)
    }

    fn peek_function_name(&self) -> Option<FunctionName> {
        match self.peek() {
            Token::AttributeExists => Some(FunctionName::AttributeExists),
            Token::AttributeNotExists => Some(FunctionName::AttributeNotExists),
            Token::BeginsWith => Some(FunctionName::BeginsWith),
            Token::Contains => Some(FunctionName::Contains),
            _ => None,
        }
    }

    /// Parse a function predicate like `begins_with(name, 'prefix')`.
    fn parse_function_expr(&mut self, name: FunctionName) -> Result<Expr, ExpressionError> {
        self.advance(); // consume function name
        self.expect(&Token::LParen)?;
        let path = self.parse_attribute_path()?;
        let arg = if name.arity() == 2 {
            self.expect(&Token::Comma)?;
            Some(self.parse_literal()?)
        } else {
            None
        };
        self.expect(&Token::RParen)?;
        Ok(Expr::Function { name, path, arg })
    }

    /// After parsing a path, parse a comparison, BETWEEN, or IN tail.
    fn parse_postfix_expr(&mut self, path: AttributePath) -> Result<Expr, ExpressionError> {
        match self.peek() {
            Token::Eq | Token::Ne | Token::Lt | Token::Le | Token::Gt | Token::Ge => {
                let op = self.parse_compare_op()?;
                let value = self.parse_literal()?;
                Ok(Expr::Compare { path, op, value })
            }
            Token::Between => {
                self.advance();
                let low = self.parse_literal()?;
                self.expect(&Token::And)?;
                let high = self.parse_literal()?;
                Ok(Expr::Between { path, low, high })
            }
            Token::In => {
                self.advance();
                self.expect(&Token::LParen)?;
                let mut list = vec![self.parse_literal()?];
                while matches!(self.peek(), Token::Comma) {
                    self.advance();
                    list.push(self.parse_literal()?);
                }
                self.expect(&Token::RParen)?;
                Ok(Expr::In { path, list })
            }
            _ => Err(ExpressionError::UnexpectedToken {
                expected: "comparison operator, BETWEEN, or IN".to_owned(),
                found: self.peek().to_string(),
            }),
        }
    }

    fn parse_compare_op(&mut self) -> Result<CompareOp, ExpressionError> {
        let tok = self.advance();
        match tok {
            Token::Eq => Ok(CompareOp::Eq),
            Token::Ne => Ok(CompareOp::Ne),
            Token::Lt => Ok(CompareOp::Lt),
            Token::Le => Ok(CompareOp::Le),
            Token::Gt => Ok(CompareOp::Gt),
            Token::Ge => Ok(CompareOp::Ge),
            _ => Err(ExpressionError::UnexpectedToken {
                expected: "comparison operator".to_owned(),
                found: tok.to_string(),
            }),
        }
    }

    fn parse_literal(&mut self) -> Result<Literal, ExpressionError> {
        let tok = self.advance();
        match tok {
            Token::StringLit(s) => Ok(Literal::S(s)),
            Token::NumberLit(n) => Ok(Literal::N(n)),
            Token::True => Ok(Literal::Bool(true)),
            Token::False => Ok(Literal::Bool(false)),
            Token::Null => Ok(Literal::Null),
            _ => Err(ExpressionError::UnexpectedToken {
                expected: "literal value".to_owned(),
                found: tok.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Path parsing
// ---------------------------------------------------------------------------

impl Parser {
    /// Parse an attribute path like `info.rating` or `tags[0]`.
    fn parse_attribute_path(&mut self) -> Result<AttributePath, ExpressionError> {
        let first = self.parse_path_head()?;
        let mut elements = vec![first];

        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    elements.push(self.parse_path_head()?);
                }
                Token::LBracket => {
                    self.advance();
                    let tok = self.advance();
                    let Token::NumberLit(raw) = tok else {
                        return Err(ExpressionError::UnexpectedToken {
                            expected: "list index".to_owned(),
                            found: tok.to_string(),
                        });
                    };
                    let idx: usize =
                        raw.parse()
                            .map_err(|_| ExpressionError::MalformedLiteral {
                                fragment: format!("'{raw}' is not a valid index"),
                            })?;
                    self.expect(&Token::RBracket)?;
                    elements.push(PathElement::Index(idx));
                }
                _ => break,
            }
        }

        Ok(AttributePath { elements })
    }

    fn parse_path_head(&mut self) -> Result<PathElement, ExpressionError> {
        let tok = self.advance();
        match tok {
            Token::Identifier(name) => Ok(PathElement::Attribute(name)),
            _ => Err(ExpressionError::UnexpectedToken {
                expected: "attribute name".to_owned(),
                found: tok.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a filter or key-condition expression.
///
/// # Errors
///
/// Returns `ExpressionError` if the expression is empty or syntactically
/// invalid.
pub fn parse_predicate(input: &str) -> Result<Expr, ExpressionError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser::new(tokens);
    if parser.at_end() {
        return Err(ExpressionError::UnexpectedEof);
    }
    let expr = parser.parse_or_expr()?;
    if !parser.at_end() {
        return Err(ExpressionError::UnexpectedToken {
            expected: "end of expression".to_owned(),
            found: parser.peek().to_string(),
        });
    }
    Ok(expr)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
