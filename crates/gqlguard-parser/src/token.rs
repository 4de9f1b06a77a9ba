//! Lexical tokens and token kinds.

use std::fmt;

use gqlguard_ast::Span;

/// Kind tag carried by every [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `!`
    Bang,
    /// `$`
    Dollar,
    /// `&`
    Amp,
    /// `(`
    ParenL,
    /// `)`
    ParenR,
    /// `...`
    Spread,
    /// `:`
    Colon,
    /// `=`
    Equals,
    /// `@`
    At,
    /// `[`
    BracketL,
    /// `]`
    BracketR,
    /// `{`
    BraceL,
    /// `|`
    Pipe,
    /// `}`
    BraceR,
    /// An identifier: `[_A-Za-z][_0-9A-Za-z]*`.
    Name,
    /// An integer literal.
    Int,
    /// A floating-point literal.
    Float,
    /// A single-line string literal (value is unescaped).
    String,
    /// A triple-quoted block string (value has common indent stripped).
    BlockString,
    /// End of input. Never counted by token-limit enforcement.
    Eof,
}

impl TokenKind {
    /// Stable label used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bang => "!",
            Self::Dollar => "$",
            Self::Amp => "&",
            Self::ParenL => "(",
            Self::ParenR => ")",
            Self::Spread => "...",
            Self::Colon => ":",
            Self::Equals => "=",
            Self::At => "@",
            Self::BracketL => "[",
            Self::BracketR => "]",
            Self::BraceL => "{",
            Self::Pipe => "|",
            Self::BraceR => "}",
            Self::Name => "Name",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::String => "String",
            Self::BlockString => "BlockString",
            Self::Eof => "<EOF>",
        }
    }

    /// Whether this is the end-of-stream marker.
    #[must_use]
    pub const fn is_eof(self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Whether tokens of this kind carry a meaningful `value`.
    #[must_use]
    pub const fn has_value(self) -> bool {
        matches!(
            self,
            Self::Name | Self::Int | Self::Float | Self::String | Self::BlockString
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Lexeme value for name/number/string kinds; empty otherwise.
    pub value: String,
    pub span: Span,
}

impl Token {
    /// Construct a valueless token (punctuators, EOF).
    #[must_use]
    pub fn punctuator(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            value: String::new(),
            span,
        }
    }

    /// Human-readable description used in `Expected ..., found ...` errors,
    /// e.g. `Name "hero"`, `"{"`, `<EOF>`.
    #[must_use]
    pub fn description(&self) -> String {
        match self.kind {
            TokenKind::Eof => "<EOF>".to_owned(),
            kind if kind.has_value() => format!("{} \"{}\"", kind.as_str(), self.value),
            kind => format!("\"{}\"", kind.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_is_distinguished() {
        assert!(TokenKind::Eof.is_eof());
        assert!(!TokenKind::Name.is_eof());
        assert!(!TokenKind::BraceR.is_eof());
    }

    #[test]
    fn descriptions_match_error_message_style() {
        let name = Token {
            kind: TokenKind::Name,
            value: "hero".to_owned(),
            span: Span::ZERO,
        };
        assert_eq!(name.description(), "Name \"hero\"");

        let brace = Token::punctuator(TokenKind::BraceL, Span::ZERO);
        assert_eq!(brace.description(), "\"{\"");

        let eof = Token::punctuator(TokenKind::Eof, Span::ZERO);
        assert_eq!(eof.description(), "<EOF>");
    }

    #[test]
    fn value_kinds() {
        assert!(TokenKind::Name.has_value());
        assert!(TokenKind::BlockString.has_value());
        assert!(!TokenKind::Spread.has_value());
        assert!(!TokenKind::Eof.has_value());
    }
}
