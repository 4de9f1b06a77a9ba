//! Parse entry point: the guarded replacement for a plain document parse.

use gqlguard_ast::Document;
use gqlguard_parser::{Lexer, ParseError, ParseOptions, Parser};

use crate::config::MaxTokensOptions;
use crate::instrumentation;
use crate::interceptor::MaxTokensLexer;
use crate::policy::process_parse_outcome;

/// Parse `source` into a document, enforcing the token limit in `config`.
///
/// Builds a fresh lexer, wraps it in a counting interceptor, and drives the
/// parser to completion. In fail-fast mode the interceptor aborts the parse
/// from inside the token stream as soon as the limit is exceeded. In
/// finish-parsing mode the policy is evaluated exactly once after the parser
/// returns — including when the parser itself failed with a grammar error,
/// in which case the count covers the tokens consumed up to the failure and
/// a token-limit rejection takes precedence over the grammar error.
///
/// # Errors
///
/// Returns the parser's own error for malformed documents, or
/// [`ParseError::TokenLimitExceeded`] when the guard rejects and
/// `propagate_on_rejection` is set.
pub fn parse_with_token_limit(
    source: &str,
    options: &ParseOptions,
    config: &MaxTokensOptions,
) -> Result<Document, ParseError> {
    let counting = MaxTokensLexer::new(Lexer::new(source), config);
    let mut parser = Parser::with_options(counting, options.clone());
    let result = parser.parse_document();

    let token_count = parser.tokens().token_count();
    if config.finish_parsing {
        process_parse_outcome(config, token_count)?;
    } else if result.is_ok() && !parser.tokens().rejected() {
        instrumentation::record_acceptance();
    }

    tracing::debug!(
        target: "gqlguard.max_tokens",
        limit = config.limit,
        token_count,
        ok = result.is_ok(),
        "guarded parse finished"
    );
    result
}

/// A boxed "parse source into document" function, the shape a hosting
/// pipeline stores wherever it would otherwise call the plain parser.
pub type ParseFn = Box<dyn Fn(&str) -> Result<Document, ParseError> + Send + Sync>;

/// Registration point: build a drop-in replacement parse function that
/// applies `config` to every document it is handed.
///
/// The returned closure owns the configuration; each invocation gets an
/// independent interceptor and count, so it is safe to call from multiple
/// threads without coordination.
#[must_use]
pub fn max_tokens_parse_fn(config: MaxTokensOptions) -> ParseFn {
    Box::new(move |source| {
        parse_with_token_limit(source, &ParseOptions::default(), &config)
    })
}
