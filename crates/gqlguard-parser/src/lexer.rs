//! Hand-written lexer for the GraphQL lexical grammar.
//!
//! The lexer yields one [`Token`] per call to [`TokenSource::advance`] and
//! then an endless stream of `Eof` tokens. Ignored source elements
//! (whitespace, commas, comments, BOM) are skipped and never surface as
//! tokens, so they are invisible to token-limit enforcement.

use std::sync::atomic::{AtomicU64, Ordering};

use gqlguard_ast::Span;
use memchr::memchr;

use crate::error::ParseError;
use crate::token::{Token, TokenKind};

/// Anything that yields tokens one at a time.
///
/// The parser is generic over this seam so that interceptors can wrap a
/// [`Lexer`] without the parser noticing. Implementors must propagate every
/// error unchanged; swallowing an error from a wrapped source breaks abort
/// semantics for wrappers that use errors to stop a parse mid-stream.
pub trait TokenSource {
    /// Produce the next token, or an endless `Eof` once input is exhausted.
    fn advance(&mut self) -> Result<Token, ParseError>;
}

// ---------------------------------------------------------------------------
// Tokenize observability counters
// ---------------------------------------------------------------------------

static TOKENS_PRODUCED_TOTAL: AtomicU64 = AtomicU64::new(0);
static LEX_ERRORS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Snapshot of process-local lexer counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenizeMetricsSnapshot {
    /// Non-EOF tokens produced across all lexer instances.
    pub tokens_produced_total: u64,
    /// Lexical errors raised across all lexer instances.
    pub lex_errors_total: u64,
}

/// Return a snapshot of the lexer observability counters.
#[must_use]
pub fn tokenize_metrics_snapshot() -> TokenizeMetricsSnapshot {
    TokenizeMetricsSnapshot {
        tokens_produced_total: TOKENS_PRODUCED_TOTAL.load(Ordering::Relaxed),
        lex_errors_total: LEX_ERRORS_TOTAL.load(Ordering::Relaxed),
    }
}

/// Reset the lexer observability counters.
pub fn reset_tokenize_metrics() {
    TOKENS_PRODUCED_TOTAL.store(0, Ordering::Relaxed);
    LEX_ERRORS_TOTAL.store(0, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

/// Streaming lexer over a source document.
#[derive(Debug)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Bind a lexer to a source document.
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Current byte offset into the source.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// The source document this lexer reads from.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.src
    }

    fn peek_byte(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }

    /// Skip whitespace, commas, comments, and the byte-order mark.
    fn skip_ignored(&mut self) {
        let bytes = self.src.as_bytes();
        loop {
            match bytes.get(self.pos) {
                Some(b' ' | b'\t' | b'\n' | b'\r' | b',') => self.pos += 1,
                Some(b'#') => {
                    // Comment runs to end of line (or end of input).
                    match memchr(b'\n', &bytes[self.pos..]) {
                        Some(rel) => self.pos += rel + 1,
                        None => self.pos = bytes.len(),
                    }
                }
                // UTF-8 BOM (EF BB BF), legal only as an ignored element.
                Some(0xEF) if self.src[self.pos..].starts_with('\u{FEFF}') => self.pos += 3,
                _ => return,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_ignored();
        let start = self.pos;

        let Some(byte) = self.peek_byte() else {
            return Ok(Token::punctuator(
                TokenKind::Eof,
                Span::new(start as u32, start as u32),
            ));
        };

        let punct = match byte {
            b'!' => Some(TokenKind::Bang),
            b'$' => Some(TokenKind::Dollar),
            b'&' => Some(TokenKind::Amp),
            b'(' => Some(TokenKind::ParenL),
            b')' => Some(TokenKind::ParenR),
            b':' => Some(TokenKind::Colon),
            b'=' => Some(TokenKind::Equals),
            b'@' => Some(TokenKind::At),
            b'[' => Some(TokenKind::BracketL),
            b']' => Some(TokenKind::BracketR),
            b'{' => Some(TokenKind::BraceL),
            b'|' => Some(TokenKind::Pipe),
            b'}' => Some(TokenKind::BraceR),
            _ => None,
        };
        if let Some(kind) = punct {
            self.pos += 1;
            return Ok(Token::punctuator(kind, self.span_from(start)));
        }

        match byte {
            b'.' => self.read_spread(start),
            b'"' => {
                if self.src[self.pos..].starts_with("\"\"\"") {
                    self.read_block_string(start)
                } else {
                    self.read_string(start)
                }
            }
            b'-' | b'0'..=b'9' => self.read_number(start),
            _ if is_name_start(byte) => Ok(self.read_name(start)),
            _ => {
                let character = self.peek_char().unwrap_or('\u{FFFD}');
                Err(ParseError::UnexpectedCharacter {
                    character,
                    offset: start as u32,
                })
            }
        }
    }

    fn read_spread(&mut self, start: usize) -> Result<Token, ParseError> {
        if self.src[self.pos..].starts_with("...") {
            self.pos += 3;
            return Ok(Token::punctuator(TokenKind::Spread, self.span_from(start)));
        }
        Err(ParseError::UnexpectedCharacter {
            character: '.',
            offset: start as u32,
        })
    }

    fn read_name(&mut self, start: usize) -> Token {
        let bytes = self.src.as_bytes();
        self.pos += 1;
        while self.pos < bytes.len() && is_name_continue(bytes[self.pos]) {
            self.pos += 1;
        }
        Token {
            kind: TokenKind::Name,
            value: self.src[start..self.pos].to_owned(),
            span: self.span_from(start),
        }
    }

    fn read_number(&mut self, start: usize) -> Result<Token, ParseError> {
        let bytes = self.src.as_bytes();
        let mut is_float = false;

        if bytes.get(self.pos) == Some(&b'-') {
            self.pos += 1;
        }

        // Integer part: `0` alone, or a non-zero digit followed by digits.
        match bytes.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                if let Some(&(digit @ b'0'..=b'9')) = bytes.get(self.pos) {
                    return Err(self.invalid_number(format!(
                        "Invalid number, unexpected digit after 0 \"{}\"",
                        digit as char
                    )));
                }
            }
            Some(b'1'..=b'9') => {
                while matches!(bytes.get(self.pos), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            }
            other => {
                let found = other.map_or("<EOF>".to_owned(), |b| format!("\"{}\"", *b as char));
                return Err(
                    self.invalid_number(format!("Invalid number, expected digit but got {found}"))
                );
            }
        }

        // Fractional part.
        if bytes.get(self.pos) == Some(&b'.') {
            is_float = true;
            self.pos += 1;
            self.read_digits()?;
        }

        // Exponent part.
        if matches!(bytes.get(self.pos), Some(b'e' | b'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(bytes.get(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.read_digits()?;
        }

        // A number must not run directly into a name or another dot.
        if let Some(&next) = bytes.get(self.pos) {
            if is_name_start(next) || next == b'.' {
                return Err(self.invalid_number(format!(
                    "Invalid number, expected digit but got \"{}\"",
                    next as char
                )));
            }
        }

        Ok(Token {
            kind: if is_float {
                TokenKind::Float
            } else {
                TokenKind::Int
            },
            value: self.src[start..self.pos].to_owned(),
            span: self.span_from(start),
        })
    }

    fn read_digits(&mut self) -> Result<(), ParseError> {
        let bytes = self.src.as_bytes();
        if !matches!(bytes.get(self.pos), Some(b'0'..=b'9')) {
            let found = bytes
                .get(self.pos)
                .map_or("<EOF>".to_owned(), |b| format!("\"{}\"", *b as char));
            return Err(
                self.invalid_number(format!("Invalid number, expected digit but got {found}"))
            );
        }
        while matches!(bytes.get(self.pos), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        Ok(())
    }

    fn invalid_number(&self, message: String) -> ParseError {
        ParseError::InvalidNumber {
            message,
            offset: self.pos as u32,
        }
    }

    fn read_string(&mut self, start: usize) -> Result<Token, ParseError> {
        self.pos += 1; // opening quote
        let mut value = String::new();

        loop {
            let Some(ch) = self.peek_char() else {
                return Err(ParseError::UnterminatedString {
                    offset: start as u32,
                });
            };
            match ch {
                '"' => {
                    self.pos += 1;
                    return Ok(Token {
                        kind: TokenKind::String,
                        value,
                        span: self.span_from(start),
                    });
                }
                '\n' | '\r' => {
                    return Err(ParseError::UnterminatedString {
                        offset: start as u32,
                    });
                }
                '\\' => {
                    self.pos += 1;
                    value.push(self.read_escape()?);
                }
                other => {
                    self.pos += other.len_utf8();
                    value.push(other);
                }
            }
        }
    }

    fn read_escape(&mut self) -> Result<char, ParseError> {
        let escape_start = self.pos - 1;
        let Some(ch) = self.peek_char() else {
            return Err(ParseError::UnterminatedString {
                offset: escape_start as u32,
            });
        };
        self.pos += ch.len_utf8();
        match ch {
            '"' => Ok('"'),
            '\\' => Ok('\\'),
            '/' => Ok('/'),
            'b' => Ok('\u{0008}'),
            'f' => Ok('\u{000C}'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'u' => {
                let hex: String = self.src[self.pos..].chars().take(4).collect();
                if hex.len() == 4 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                    self.pos += 4;
                    let code = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
                    char::from_u32(code).ok_or_else(|| ParseError::InvalidEscape {
                        sequence: format!("\\u{hex}"),
                        offset: escape_start as u32,
                    })
                } else {
                    Err(ParseError::InvalidEscape {
                        sequence: format!("\\u{hex}"),
                        offset: escape_start as u32,
                    })
                }
            }
            other => Err(ParseError::InvalidEscape {
                sequence: format!("\\{other}"),
                offset: escape_start as u32,
            }),
        }
    }

    fn read_block_string(&mut self, start: usize) -> Result<Token, ParseError> {
        self.pos += 3; // opening quotes
        let mut raw = String::new();

        loop {
            let rest = &self.src[self.pos..];
            if rest.is_empty() {
                return Err(ParseError::UnterminatedString {
                    offset: start as u32,
                });
            }
            if rest.starts_with("\\\"\"\"") {
                raw.push_str("\"\"\"");
                self.pos += 4;
                continue;
            }
            if rest.starts_with("\"\"\"") {
                self.pos += 3;
                return Ok(Token {
                    kind: TokenKind::BlockString,
                    value: block_string_value(&raw),
                    span: self.span_from(start),
                });
            }
            let ch = rest.chars().next().unwrap_or('\u{FFFD}');
            self.pos += ch.len_utf8();
            raw.push(ch);
        }
    }
}

impl TokenSource for Lexer<'_> {
    fn advance(&mut self) -> Result<Token, ParseError> {
        match self.next_token() {
            Ok(token) => {
                if !token.kind.is_eof() {
                    TOKENS_PRODUCED_TOTAL.fetch_add(1, Ordering::Relaxed);
                }
                Ok(token)
            }
            Err(error) => {
                LEX_ERRORS_TOTAL.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(target: "gqlguard.lexer", %error, offset = self.pos, "lex error");
                Err(error)
            }
        }
    }
}

fn is_name_start(byte: u8) -> bool {
    byte == b'_' || byte.is_ascii_alphabetic()
}

fn is_name_continue(byte: u8) -> bool {
    byte == b'_' || byte.is_ascii_alphanumeric()
}

/// Cooked value of a block string: strip the common indentation of all lines
/// after the first, then drop leading and trailing blank lines.
fn block_string_value(raw: &str) -> String {
    let lines: Vec<&str> = raw.split(['\n']).map(|line| line.trim_end_matches('\r')).collect();

    let common_indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let mut cooked: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if idx == 0 {
                *line
            } else {
                line.get(common_indent..).unwrap_or("")
            }
        })
        .collect();

    while cooked.first().is_some_and(|line| line.trim().is_empty()) {
        cooked.remove(0);
    }
    while cooked.last().is_some_and(|line| line.trim().is_empty()) {
        cooked.pop();
    }

    cooked.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
