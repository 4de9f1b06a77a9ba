//! Hand-written lexer and recursive descent parser for executable GraphQL
//! documents.
//!
//! The parser is generic over the [`TokenSource`] trait, the seam used by
//! token-counting wrappers to observe the token stream without changing
//! parsing semantics.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use error::ParseError;
pub use lexer::{
    Lexer, TokenSource, TokenizeMetricsSnapshot, reset_tokenize_metrics, tokenize_metrics_snapshot,
};
pub use parser::{DEFAULT_RECURSION_LIMIT, ParseOptions, Parser, parse, parse_with_options};
pub use token::{Token, TokenKind};
