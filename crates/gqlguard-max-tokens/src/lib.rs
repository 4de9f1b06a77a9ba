//! Token-limit guard for the GraphQL parser.
//!
//! Protects services that parse untrusted documents from oversized inputs:
//! a counting interceptor sits between the lexer and the parser, tracks how
//! many lexical tokens the document produces, and rejects it once a
//! configured ceiling is exceeded — either immediately (fail-fast, the
//! default) or after the whole stream has been counted (finish-parsing).
//!
//! ```
//! use gqlguard_max_tokens::{MaxTokensOptions, parse_with_token_limit};
//! use gqlguard_parser::ParseOptions;
//!
//! # fn main() -> Result<(), gqlguard_parser::ParseError> {
//! let config = MaxTokensOptions::new().with_limit(8);
//! let doc = parse_with_token_limit("{ hero { name } }", &ParseOptions::default(), &config)?;
//! assert_eq!(doc.definitions.len(), 1);
//!
//! let oversized = parse_with_token_limit("{ a b c d e f g h i }", &ParseOptions::default(), &config);
//! assert_eq!(
//!     oversized.unwrap_err().to_string(),
//!     "Syntax Error: Token limit of 8 exceeded.",
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod instrumentation;
pub mod interceptor;
pub mod parse;
pub mod policy;

pub use config::{
    AcceptCallback, DEFAULT_TOKEN_LIMIT, MaxTokensOptions, ParseOutcome, RejectCallback,
};
pub use instrumentation::{
    MaxTokensMetricsSnapshot, max_tokens_metrics_snapshot, reset_max_tokens_metrics,
};
pub use interceptor::MaxTokensLexer;
pub use parse::{ParseFn, max_tokens_parse_fn, parse_with_token_limit};
pub use policy::process_parse_outcome;
