//! lazy tokenizer for the text form

use core::iter::Peekable;
use core::str::Chars;

use crate::types::{ClvmError, Position, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Open,
    Close,
    Dot,
    /// contents of a `"..."` or `'...'` literal, quotes removed
    Quoted(String),
    /// number, hex literal or keyword
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

/// splits source text into tokens on demand
pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// skip whitespace and `;` comments
    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == ';' {
                while matches!(self.chars.peek(), Some(&c) if c != '\n') {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_quoted(&mut self, quote: char, position: Position) -> Result<TokenKind> {
        self.advance();
        let mut text = String::new();
        loop {
            match self.advance() {
                Some(ch) if ch == quote => return Ok(TokenKind::Quoted(text)),
                Some(ch) => text.push(ch),
                None => {
                    return Err(ClvmError::parse("unterminated quoted string", Some(position)))
                }
            }
        }
    }

    fn read_word(&mut self) -> TokenKind {
        let mut word = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | ';') {
                break;
            }
            word.push(ch);
            self.advance();
        }
        if word == "." {
            TokenKind::Dot
        } else {
            TokenKind::Word(word)
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let position = self.current_position();
        let ch = *self.chars.peek()?;

        let kind = match ch {
            '(' => {
                self.advance();
                TokenKind::Open
            }
            ')' => {
                self.advance();
                TokenKind::Close
            }
            '"' | '\'' => match self.read_quoted(ch, position) {
                Ok(kind) => kind,
                Err(e) => return Some(Err(e)),
            },
            _ => self.read_word(),
        };

        Some(Ok(Token { kind, position }))
    }
}
