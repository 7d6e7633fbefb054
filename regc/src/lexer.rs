#![expect(missing_docs)]

use std::{iter::Peekable, str};

use thiserror::Error;
use tracing::trace;

use crate::error::{ErrorKind, Severity};

/// Reserved words that name a data type.
pub const DATA_TYPES: [&str; 2] = ["uint16", "void"];

const MAX_LOOKAHEAD: usize = 2;

const MULTI_CHAR_TOKENS: [(&str, TokenKind); 1] = [("==", TokenKind::Equality)];

const SINGLE_CHAR_TOKENS: [(char, TokenKind); 10] = [
    ('=', TokenKind::Assign),
    (';', TokenKind::EndOfStatement),
    ('+', TokenKind::Plus),
    ('-', TokenKind::Minus),
    ('(', TokenKind::ParenOpen),
    (')', TokenKind::ParenClose),
    (',', TokenKind::Comma),
    ('*', TokenKind::Asterisk),
    ('{', TokenKind::BraceOpen),
    ('}', TokenKind::BraceClose),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    EndOfStatement,
    NumericLiteral,
    Identifier,
    DataType,
    Assign,
    Equality,
    Plus,
    Minus,
    Comma,
    Asterisk,
    ParenOpen,
    ParenClose,
    BraceOpen,
    BraceClose,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "EOF")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unrecognized token: '{0}'")]
    UnrecognizedToken(char),
}

impl LexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LexError::UnrecognizedToken(_) => ErrorKind::UnrecognizedToken,
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

/// Tokenize `input`. The result always ends with a single [`TokenKind::Eof`].
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }

    trace!(count = tokens.len(), "lexed tokens");
    Ok(tokens)
}

pub struct Lexer<'a> {
    chars: Peekable<str::Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let ch = match self.chars.peek() {
            None => return Ok(Token::eof()),
            Some(&c) => c,
        };

        if let Some(token) = self.read_multi_char() {
            return Ok(token);
        }

        if let Some((_, kind)) = SINGLE_CHAR_TOKENS.iter().find(|(c, _)| *c == ch) {
            self.chars.next();
            return Ok(Token::new(*kind, ch));
        }

        if ch.is_ascii_alphanumeric() {
            let word = self.read_word();
            let kind = if DATA_TYPES.contains(&word.as_str()) {
                TokenKind::DataType
            } else if word.chars().all(|c| c.is_ascii_digit()) {
                TokenKind::NumericLiteral
            } else {
                TokenKind::Identifier
            };
            return Ok(Token::new(kind, word));
        }

        self.chars.next();
        Err(LexError::UnrecognizedToken(ch))
    }

    fn read_multi_char(&mut self) -> Option<Token> {
        let window: String = self.chars.clone().take(MAX_LOOKAHEAD).collect();
        let (text, kind) = MULTI_CHAR_TOKENS
            .iter()
            .find(|(text, _)| window.starts_with(text))?;

        for _ in 0..text.chars().count() {
            self.chars.next();
        }
        Some(Token::new(*kind, *text))
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();

        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_alphanumeric() {
                word.push(ch);
                self.chars.next();
            } else {
                break;
            }
        }

        word
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if matches!(ch, ' ' | '\t' | '\r' | '\n') {
                self.chars.next();
            } else {
                break;
            }
        }
    }
}
