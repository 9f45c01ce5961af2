//! Formula tokenizer.
//!
//! Splits formula text into numbers, string literals, names, operators,
//! parentheses and commas. Dotted names such as `math.sqrt` are a single name
//! token. The word operators `and`, `or`, `not`, `in` and `is` are operator
//! tokens, with `not in` and `is not` fused into one token each.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use strata_core::{Error, Result};

/// Token classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    String,
    Name,
    Operator,
    LParen,
    RParen,
    Comma,
}

/// A token and the byte offset it starts at.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text; for string literals, the unescaped contents.
    pub text: String,
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// True for an operator token with the given text.
    pub fn is_operator(&self, text: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == text
    }
}

const WORD_OPERATORS: &[&str] = &["and", "or", "not", "in", "is"];

// longest first so that `**` wins over `*`
const SYMBOL_OPERATORS: &[&str] = &[
    "**", "//", "<<", ">>", "<=", ">=", "==", "!=", "+", "-", "*", "/", "%", "&", "|", "^",
    "~", "<", ">", "!",
];

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if pred(c) {
                self.advance();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn number(&mut self) -> Result<Token> {
        let start = self.pos;
        self.take_while(|c| c.is_ascii_digit() || c == '_');
        if self.peek() == Some('.') {
            self.advance();
            self.take_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let mark = self.pos;
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            if self.take_while(|c| c.is_ascii_digit()).is_empty() {
                return Err(Error::compile("malformed exponent", mark));
            }
        }
        let text = &self.input[start..self.pos];
        if text == "." {
            return Err(Error::compile("unexpected '.'", start));
        }
        if self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            return Err(Error::compile(
                format!("invalid number literal '{}'", text),
                start,
            ));
        }
        Ok(Token::new(TokenKind::Number, text.replace('_', ""), start))
    }

    fn string(&mut self, quote: char) -> Result<Token> {
        let start = self.pos;
        self.advance();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            self.advance();
            if c == quote {
                return Ok(Token::new(TokenKind::String, text, start));
            }
            if c == '\\' {
                let escaped = self
                    .peek()
                    .ok_or_else(|| Error::compile("unterminated string", start))?;
                self.advance();
                text.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
            } else {
                text.push(c);
            }
        }
        Err(Error::compile("unterminated string", start))
    }

    fn word(&mut self) -> &'a str {
        self.take_while(|c| c.is_alphanumeric() || c == '_')
    }

    fn name(&mut self) -> Result<Token> {
        let start = self.pos;
        self.word();
        while self.peek() == Some('.') && self.peek_second().is_some_and(is_name_start) {
            self.advance();
            self.word();
        }
        if self.peek() == Some('.') {
            return Err(Error::compile("expected a name after '.'", self.pos));
        }
        let text = &self.input[start..self.pos];
        if !WORD_OPERATORS.contains(&text) {
            return Ok(Token::new(TokenKind::Name, text, start));
        }

        // fuse `not in` and `is not`
        let follower = match text {
            "not" => Some("in"),
            "is" => Some("not"),
            _ => None,
        };
        if let Some(follower) = follower {
            let mark = self.pos;
            self.skip_whitespace();
            if self.peek().is_some_and(is_name_start) && self.word() == follower {
                let fused = format!("{} {}", text, follower);
                return Ok(Token::new(TokenKind::Operator, fused, start));
            }
            self.pos = mark;
        }
        Ok(Token::new(TokenKind::Operator, text, start))
    }

    fn symbol(&mut self) -> Result<Token> {
        let start = self.pos;
        let rest = self.rest();
        let op = SYMBOL_OPERATORS
            .iter()
            .find(|op| rest.starts_with(**op))
            .ok_or_else(|| {
                let c = rest.chars().next().unwrap_or(' ');
                Error::compile(format!("unexpected character '{}'", c), start)
            })?;
        self.pos += op.len();
        Ok(Token::new(TokenKind::Operator, *op, start))
    }

    fn next_token(&mut self) -> Option<Result<Token>> {
        self.skip_whitespace();
        let c = self.peek()?;
        let start = self.pos;
        let token = match c {
            '(' => {
                self.advance();
                Ok(Token::new(TokenKind::LParen, "(", start))
            }
            ')' => {
                self.advance();
                Ok(Token::new(TokenKind::RParen, ")", start))
            }
            ',' => {
                self.advance();
                Ok(Token::new(TokenKind::Comma, ",", start))
            }
            '\'' | '"' => self.string(c),
            '.' if self.peek_second().is_some_and(|d| d.is_ascii_digit()) => self.number(),
            c if c.is_ascii_digit() => self.number(),
            c if is_name_start(c) => self.name(),
            _ => self.symbol(),
        };
        Some(token)
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Splits formula text into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token() {
        tokens.push(token?);
    }
    if tokens.is_empty() {
        return Err(Error::compile("empty expression", 0));
    }
    Ok(tokens)
}

/// Renders tokens back to a compact, space-separated form.
pub fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| match t.kind {
            TokenKind::String => format!("{:?}", t.text),
            _ => t.text.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
