//! Tokenizer for the literal-expression grammar.
//!
//! Converts a UTF-8 body into a lazy sequence of [`Token`]s. Each token
//! carries its start/end byte offsets into the original input (header
//! included), and the tokenizer tracks line/column for diagnostics. Tokens
//! are produced on demand by [`Tokenizer::next_token`] and are not retained
//! once the parser has consumed them.

use crate::{Error, Result};

/// The lexical kind of a token, carrying decoded payload where relevant.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Comma,
    Colon,
    /// Numeric literal. The raw lexeme is kept verbatim (sign, digits,
    /// exponent); `float` is set when a `.` or exponent was seen, and
    /// `imaginary` when the lexeme ended with `j`/`J` (marker stripped).
    Number {
        lexeme: String,
        float: bool,
        imaginary: bool,
    },
    /// String literal with escape sequences already decoded.
    Str(String),
    /// A bare identifier (`None`, `True`, `False`, or anything else the
    /// parser will reject).
    Ident(String),
    Eof,
}

impl TokenKind {
    /// Short human-readable description, used in expected-vs-found messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Number { imaginary: true, .. } => "imaginary number",
            TokenKind::Number { .. } => "number",
            TokenKind::Str(_) => "string",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Eof => "end of input",
        }
    }
}

/// A single lexical token with its byte span in the original input, plus
/// the line/column where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

/// Streaming tokenizer over the grammar body.
///
/// `base` is the byte offset of the body within the full input, so reported
/// offsets stay meaningful when an opaque header line was stripped first.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    base: usize,
    line: usize,
    column: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str, base: usize, line: usize) -> Self {
        Tokenizer {
            input,
            pos: 0,
            base,
            line,
            column: 1,
        }
    }

    /// Absolute byte offset of the current position.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.input[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn err(&self, msg: impl Into<String>) -> Error {
        Error::lex(self.offset(), self.line, self.column, msg)
    }

    /// Produces the next token, advancing past it.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Lex`] on an unterminated string, an invalid
    /// escape sequence, a malformed number lexeme, or a stray character.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        let start = self.offset();
        let line = self.line;
        let column = self.column;

        let Some(ch) = self.peek_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                start,
                end: start,
                line,
                column,
            });
        };

        let kind = match ch {
            '{' => self.punct(TokenKind::LeftBrace),
            '}' => self.punct(TokenKind::RightBrace),
            '[' => self.punct(TokenKind::LeftBracket),
            ']' => self.punct(TokenKind::RightBracket),
            '(' => self.punct(TokenKind::LeftParen),
            ')' => self.punct(TokenKind::RightParen),
            ',' => self.punct(TokenKind::Comma),
            ':' => self.punct(TokenKind::Colon),
            '\'' | '"' => self.scan_string()?,
            '-' | '+' | '0'..='9' => self.scan_number()?,
            'a'..='z' | 'A'..='Z' | '_' => self.scan_ident(),
            other => return Err(self.err(format!("unexpected character {other:?}"))),
        };

        Ok(Token {
            kind,
            start,
            end: self.offset(),
            line,
            column,
        })
    }

    fn punct(&mut self, kind: TokenKind) -> TokenKind {
        self.next_char();
        kind
    }

    fn scan_ident(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.next_char();
            } else {
                break;
            }
        }
        TokenKind::Ident(self.input[start..self.pos].to_string())
    }

    fn scan_string(&mut self) -> Result<TokenKind> {
        let Some(quote) = self.next_char() else {
            return Err(self.err("unterminated string"));
        };
        let mut text = String::new();

        loop {
            match self.next_char() {
                None => return Err(self.err("unterminated string")),
                Some(ch) if ch == quote => return Ok(TokenKind::Str(text)),
                Some('\\') => match self.next_char() {
                    Some('\\') => text.push('\\'),
                    Some('\'') => text.push('\''),
                    Some('"') => text.push('"'),
                    Some('n') => text.push('\n'),
                    Some('r') => text.push('\r'),
                    Some('t') => text.push('\t'),
                    Some('x') => text.push(self.scan_hex_escape(2)?),
                    Some('u') => text.push(self.scan_hex_escape(4)?),
                    Some(other) => {
                        return Err(self.err(format!("invalid escape sequence '\\{other}'")))
                    }
                    None => return Err(self.err("unterminated string")),
                },
                // Any other character, control characters included, is
                // taken verbatim.
                Some(other) => text.push(other),
            }
        }
    }

    fn scan_hex_escape(&mut self, digits: usize) -> Result<char> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let digit = self
                .next_char()
                .and_then(|ch| ch.to_digit(16))
                .ok_or_else(|| self.err(format!("expected {digits} hex digits in escape")))?;
            value = value * 16 + digit;
        }
        char::from_u32(value).ok_or_else(|| self.err("escape is not a valid code point"))
    }

    fn scan_number(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        let mut float = false;

        if matches!(self.peek_char(), Some('-' | '+')) {
            self.next_char();
        }
        if self.scan_digits() == 0 {
            return Err(self.err("expected digits in number"));
        }
        if self.peek_char() == Some('.') {
            float = true;
            self.next_char();
            if self.scan_digits() == 0 {
                return Err(self.err("expected digits after decimal point"));
            }
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            float = true;
            self.next_char();
            if matches!(self.peek_char(), Some('-' | '+')) {
                self.next_char();
            }
            if self.scan_digits() == 0 {
                return Err(self.err("expected digits in exponent"));
            }
        }

        let end = self.pos;
        let imaginary = matches!(self.peek_char(), Some('j' | 'J'));
        if imaginary {
            self.next_char();
        }

        Ok(TokenKind::Number {
            lexeme: self.input[start..end].to_string(),
            float,
            imaginary,
        })
    }

    fn scan_digits(&mut self) -> usize {
        let mut count = 0;
        while matches!(self.peek_char(), Some('0'..='9')) {
            self.next_char();
            count += 1;
        }
        count
    }
}
