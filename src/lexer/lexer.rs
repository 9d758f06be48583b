use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::CasError;
use crate::lexer::token::{Token, TokenKind};

/// Identifier spellings that lex to a dedicated token kind instead of
/// `Variable`. Modeled on a `KEYWORDS` static
/// (`lexer/lexer.rs`), but here it holds the single `sqrt` keyword that
/// spec.md's binding-power table requires (see `SPEC_FULL.md` §3).
static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("sqrt", TokenKind::Sqrt);
    m
});

fn single_char_operator(c: char) -> Option<TokenKind> {
    match c {
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        '=' => Some(TokenKind::Assign),
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        '*' => Some(TokenKind::Multiply),
        '/' => Some(TokenKind::Divide),
        '%' => Some(TokenKind::Modulo),
        '^' => Some(TokenKind::Power),
        _ => None,
    }
}

/// Produces one token at a time from a source string, with one-token
/// lookahead (spec.md §4.1).
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    peeked: Option<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer { chars: source.chars().collect(), pos: 0, peeked: None }
    }

    pub fn next(&mut self) -> Result<Token, CasError> {
        if let Some(t) = self.peeked.take() {
            return Ok(t);
        }
        self.scan()
    }

    pub fn peek(&mut self) -> Result<Token, CasError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.scan()?);
        }
        Ok(self.peeked.clone().unwrap())
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn scan(&mut self) -> Result<Token, CasError> {
        self.skip_whitespace();

        let Some(c) = self.current() else {
            return Ok(Token::new(TokenKind::End, ""));
        };

        if let Some(kind) = single_char_operator(c) {
            self.advance();
            return Ok(Token::new(kind, c.to_string()));
        }

        if c.is_ascii_digit() {
            return Ok(self.scan_number());
        }

        if c.is_alphabetic() {
            return Ok(self.scan_identifier());
        }

        self.advance();
        Err(CasError::Lex(format!("unknown character '{c}'")))
    }

    /// A digit starts a `Number`; consume until the next non-`[0-9.]`
    /// (spec.md §4.1).
    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.current(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.advance();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        Token::new(TokenKind::Number, text)
    }

    /// A letter starts a `Variable`; consume until the next operator,
    /// parenthesis, or whitespace character (spec.md §4.1), so
    /// multi-character names and embedded digits (`x1`, `rate2`) work.
    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.current() {
            if c.is_whitespace() || single_char_operator(c).is_some() {
                break;
            }
            self.advance();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let kind = KEYWORDS.get(text.as_str()).copied().unwrap_or(TokenKind::Variable);
        Token::new(kind, text)
    }
}
