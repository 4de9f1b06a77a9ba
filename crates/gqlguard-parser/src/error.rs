//! Parse errors for the lexing/parsing pipeline.
//!
//! Every error renders in the `Syntax Error: ...` message family. The
//! `TokenLimitExceeded` variant is constructed by the token-limit guard, not
//! by the lexer or parser; it lives here so that the whole pipeline shares a
//! single error vocabulary and the guard's abort unwinds through the parser
//! as an ordinary `Err`.

use gqlguard_ast::Span;
use thiserror::Error;

/// Errors produced while lexing or parsing a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character that cannot begin any token.
    #[error("Syntax Error: Unexpected character {character:?}.")]
    UnexpectedCharacter { character: char, offset: u32 },

    /// A string literal that ran into end of line or end of input.
    #[error("Syntax Error: Unterminated string.")]
    UnterminatedString { offset: u32 },

    /// A malformed numeric literal. `message` describes the defect, e.g.
    /// `Invalid number, expected digit but got "a"`.
    #[error("Syntax Error: {message}.")]
    InvalidNumber { message: String, offset: u32 },

    /// An invalid escape sequence inside a string literal.
    #[error("Syntax Error: Invalid character escape sequence: {sequence}.")]
    InvalidEscape { sequence: String, offset: u32 },

    /// The parser expected one construct and found another token.
    #[error("Syntax Error: Expected {expected}, found {found}.")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    /// A token that cannot appear at this position at all.
    #[error("Syntax Error: Unexpected {found}.")]
    Unexpected { found: String, span: Span },

    /// A variable reference in a constant value position.
    #[error("Syntax Error: Unexpected variable \"${name}\" in constant value.")]
    UnexpectedVariable { name: String, span: Span },

    /// Nesting deeper than [`ParseOptions::recursion_limit`] permits.
    ///
    /// [`ParseOptions::recursion_limit`]: crate::ParseOptions
    #[error("Syntax Error: Recursion limit of {limit} exceeded.")]
    RecursionLimitExceeded { limit: usize, span: Span },

    /// The document produced more lexical tokens than the configured
    /// ceiling allows. `found` carries the exact count only when the whole
    /// stream was consumed before enforcement (finish-parsing mode).
    #[error("{}", token_limit_message(*limit, *found))]
    TokenLimitExceeded { limit: usize, found: Option<usize> },
}

impl ParseError {
    /// Source span of the error, when one is known.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedCharacter { offset, .. }
            | Self::UnterminatedString { offset }
            | Self::InvalidNumber { offset, .. }
            | Self::InvalidEscape { offset, .. } => {
                Some(Span::new(*offset, offset.saturating_add(1)))
            }
            Self::UnexpectedToken { span, .. }
            | Self::Unexpected { span, .. }
            | Self::UnexpectedVariable { span, .. }
            | Self::RecursionLimitExceeded { span, .. } => Some(*span),
            Self::TokenLimitExceeded { .. } => None,
        }
    }

    /// Whether this is the token-limit rejection raised by the guard.
    #[must_use]
    pub const fn is_token_limit(&self) -> bool {
        matches!(self, Self::TokenLimitExceeded { .. })
    }
}

fn token_limit_message(limit: usize, found: Option<usize>) -> String {
    match found {
        Some(count) => format!("Syntax Error: Token limit of {limit} exceeded, found {count}."),
        None => format!("Syntax Error: Token limit of {limit} exceeded."),
    }
}
