//! Facade crate: GraphQL document parsing with a token-limit guard.
//!
//! Re-exports the component crates and provides the two entry points most
//! callers need: [`parse`] for an unguarded parse and
//! [`parse_with_token_limit`] for the guarded one.
//!
//! ```
//! use gqlguard::max_tokens::MaxTokensOptions;
//!
//! let config = MaxTokensOptions::new().with_limit(6);
//! let doc = gqlguard::parse_with_token_limit("{ hero { name } }", &config)?;
//! assert!(doc.operation("Missing").is_none());
//!
//! let err = gqlguard::parse_with_token_limit("{ a b c d e f }", &config).unwrap_err();
//! assert_eq!(err.to_string(), "Syntax Error: Token limit of 6 exceeded.");
//! # Ok::<(), gqlguard::ParseError>(())
//! ```

pub use gqlguard_ast as ast;
pub use gqlguard_max_tokens as max_tokens;
pub use gqlguard_parser as parser;

pub use gqlguard_ast::Document;
pub use gqlguard_parser::{ParseError, ParseOptions, parse};

use gqlguard_max_tokens::MaxTokensOptions;

/// Parse a document with default parse options, enforcing `config`'s token
/// limit.
pub fn parse_with_token_limit(
    source: &str,
    config: &MaxTokensOptions,
) -> Result<Document, ParseError> {
    gqlguard_max_tokens::parse_with_token_limit(source, &ParseOptions::default(), config)
}
