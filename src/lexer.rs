use core::fmt;
use std::{hash::{Hash, Hasher}, io::BufRead};

use logos::Logos;

use crate::error::{SillyResult, SyntaxError};

// Recognizes a whole lexeme. Anything the lexer cannot cover in a single
// token is classified as unknown.
#[derive(Debug, Logos)]
enum Lexeme {
    #[token("{")]
    #[token("}")]
    #[token("(")]
    #[token(")")]
    #[token("[")]
    #[token("]")]
    Delimiter,

    #[token("=")]
    #[token("print")]
    #[token("if")]
    #[token("else")]
    #[token("while")]
    #[token("repeat")]
    #[token("func")]
    #[token("return")]
    Keyword,

    #[token("==")]
    #[token("!=")]
    #[token(">")]
    #[token(">=")]
    #[token("<")]
    #[token("<=")]
    #[token("and")]
    #[token("or")]
    #[token("not")]
    BoolOperator,

    #[token("+")]
    #[token("*")]
    #[token("/")]
    MathOperator,

    #[token("len")]
    #[token("get")]
    #[token("cat")]
    #[token("str")]
    SequenceOperator,

    #[token("true")]
    #[token("false")]
    BoolLiteral,

    #[regex(r"-?[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?")]
    NumberLiteral,

    #[regex(r"[a-zA-Z][a-zA-Z0-9]*")]
    Identifier,

    #[regex(r#""[^"]*""#)]
    StringLiteral,

    #[regex(r"'[^\n]'")]
    CharLiteral,
}

/// Syntactic category of a token, derived from its spelling alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Delimiter,
    Keyword,
    Identifier,
    BoolOperator,
    MathOperator,
    SequenceOperator,
    NumberLiteral,
    BoolLiteral,
    CharLiteral,
    StringLiteral,
    Unknown,
}

impl From<Lexeme> for TokenKind {
    fn from(lexeme: Lexeme) -> Self {
        match lexeme {
            Lexeme::Delimiter => Self::Delimiter,
            Lexeme::Keyword => Self::Keyword,
            Lexeme::BoolOperator => Self::BoolOperator,
            Lexeme::MathOperator => Self::MathOperator,
            Lexeme::SequenceOperator => Self::SequenceOperator,
            Lexeme::BoolLiteral => Self::BoolLiteral,
            Lexeme::NumberLiteral => Self::NumberLiteral,
            Lexeme::Identifier => Self::Identifier,
            Lexeme::StringLiteral => Self::StringLiteral,
            Lexeme::CharLiteral => Self::CharLiteral,
        }
    }
}

impl TokenKind {
    pub fn classify(spelling: &str) -> Self {
        let mut lexer = Lexeme::lexer(spelling);
        match lexer.next() {
            Some(Ok(lexeme)) if lexer.span().end == spelling.len() => lexeme.into(),
            _ => Self::Unknown,
        }
    }

    pub fn is_literal(self) -> bool {
        matches!(self, Self::NumberLiteral | Self::BoolLiteral | Self::CharLiteral | Self::StringLiteral)
    }

    /// Tokens allowed at the head of a parenthesized expression.
    pub fn is_callable(self) -> bool {
        matches!(self, Self::Identifier | Self::MathOperator | Self::BoolOperator | Self::SequenceOperator)
    }
}

/// A lexeme together with its category. Equality and hashing only look at the spelling.
#[derive(Debug, Clone, Eq)]
pub struct Token {
    spelling: String,
    kind: TokenKind,
}

impl Token {
    pub fn new(spelling: impl Into<String>) -> Self {
        let spelling = spelling.into();
        let kind = TokenKind::classify(&spelling);
        Self { spelling, kind }
    }

    pub fn spelling(&self) -> &str {
        &self.spelling
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn is(&self, spelling: &str) -> bool {
        self.spelling == spelling
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.spelling == other.spelling
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.spelling.hash(state)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling)
    }
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '{' | '}' | '(' | ')' | '[' | ']')
}

fn chunk_length(buffer: &str) -> usize {
    buffer.find(char::is_whitespace).unwrap_or(buffer.len())
}

// Byte length of the lexeme at the start of a non-empty, left-trimmed buffer.
// A lexeme never extends past the whitespace-delimited chunk it starts in.
fn lexeme_length(buffer: &str) -> usize {
    let chunk = &buffer[..chunk_length(buffer)];
    let Some(first) = chunk.chars().next() else { return 0 };
    match first {
        c if is_delimiter(c) => c.len_utf8(),
        '"' => chunk[1..].find('"').map_or(chunk.len(), |closing| closing + 2),
        '\'' => chunk.char_indices().nth(3).map_or(chunk.len(), |(end, _)| end),
        _ => chunk.find(is_delimiter).unwrap_or(chunk.len()),
    }
}

/// Splits a character source into tokens, one line at a time.
///
/// Lines are only pulled from the source when the current one is used up, so an
/// interactive source blocks until the next token is actually needed.
pub struct TokenStream<R> {
    input: R,
    buffer: String,
    pending: Option<Token>,
}

impl<'a> TokenStream<&'a [u8]> {
    pub fn from_source(source: &'a str) -> Self {
        Self::new(source.as_bytes())
    }
}

impl<R: BufRead> TokenStream<R> {
    pub fn new(input: R) -> Self {
        Self { input, buffer: String::new(), pending: None }
    }

    // Pulls lines until the buffer holds something, returns false on end of input
    fn fill_buffer(&mut self) -> SillyResult<bool> {
        while self.buffer.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            self.buffer = line.trim().to_owned();
        }
        Ok(true)
    }

    /// Returns the next token without consuming it.
    pub fn lookahead(&mut self) -> SillyResult<&Token> {
        if self.pending.is_none() {
            if !self.fill_buffer()? {
                return Err(SyntaxError::UnexpectedEnd.into());
            }
            let length = lexeme_length(&self.buffer);
            let token = Token::new(&self.buffer[..length]);
            self.buffer = self.buffer[length..].trim_start().to_owned();
            self.pending = Some(token);
        }
        self.pending.as_ref().ok_or_else(|| SyntaxError::UnexpectedEnd.into())
    }

    pub fn next(&mut self) -> SillyResult<Token> {
        self.lookahead()?;
        self.pending.take().ok_or_else(|| SyntaxError::UnexpectedEnd.into())
    }

    pub fn has_next(&mut self) -> SillyResult<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }
        self.fill_buffer()
    }
}
