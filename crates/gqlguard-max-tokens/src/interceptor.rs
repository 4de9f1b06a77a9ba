//! Token-counting wrapper around a [`TokenSource`].

use gqlguard_parser::{ParseError, Token, TokenSource};

use crate::config::MaxTokensOptions;
use crate::policy::process_parse_outcome;

/// A [`TokenSource`] decorator that counts every non-EOF token the wrapped
/// source yields.
///
/// In fail-fast mode (the default) each count update is checked against the
/// limit immediately and the first exceeding token aborts the parse by
/// returning the rejection error from [`advance`](TokenSource::advance),
/// which unwinds through the parser's `?` chain. In finish-parsing mode the
/// wrapper only counts; the driving function enforces the limit once the
/// parser returns.
///
/// The wrapper holds the wrapped source by exclusive ownership and forwards
/// tokens unchanged. It owns the count for exactly one parse call.
#[derive(Debug)]
pub struct MaxTokensLexer<'cfg, S> {
    inner: S,
    config: &'cfg MaxTokensOptions,
    token_count: usize,
    rejected: bool,
}

impl<'cfg, S: TokenSource> MaxTokensLexer<'cfg, S> {
    /// Wrap a token source with the given configuration.
    #[must_use]
    pub fn new(inner: S, config: &'cfg MaxTokensOptions) -> Self {
        Self {
            inner,
            config,
            token_count: 0,
            rejected: false,
        }
    }

    /// Number of non-EOF tokens observed so far.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Whether a fail-fast rejection has fired for this parse.
    ///
    /// Only meaningful with `propagate_on_rejection = false`, where parsing
    /// continues past the rejection and the caller receives a document.
    #[must_use]
    pub fn rejected(&self) -> bool {
        self.rejected
    }

    /// Read-only access to the wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap, returning the wrapped source.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: TokenSource> TokenSource for MaxTokensLexer<'_, S> {
    fn advance(&mut self) -> Result<Token, ParseError> {
        let token = self.inner.advance()?;
        if !token.kind.is_eof() {
            self.token_count += 1;
        }
        // The latch guarantees at-most-once observer dispatch when a
        // non-propagated rejection lets the parse continue.
        if !self.config.finish_parsing && !self.rejected && self.token_count > self.config.limit {
            self.rejected = true;
            process_parse_outcome(self.config, self.token_count)?;
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use gqlguard_ast::Span;
    use gqlguard_parser::TokenKind;

    use super::*;

    /// Stub source yielding `n` name tokens and then EOF forever.
    struct StubSource {
        remaining: usize,
    }

    impl TokenSource for StubSource {
        fn advance(&mut self) -> Result<Token, ParseError> {
            if self.remaining == 0 {
                return Ok(Token::punctuator(TokenKind::Eof, Span::ZERO));
            }
            self.remaining -= 1;
            Ok(Token {
                kind: TokenKind::Name,
                value: "a".to_owned(),
                span: Span::ZERO,
            })
        }
    }

    fn drain<S: TokenSource>(source: &mut S) -> Result<usize, ParseError> {
        let mut produced = 0;
        loop {
            let token = source.advance()?;
            if token.kind.is_eof() {
                return Ok(produced);
            }
            produced += 1;
        }
    }

    #[test]
    fn counts_non_eof_tokens_only() {
        let options = MaxTokensOptions::new().with_limit(100);
        let mut lexer = MaxTokensLexer::new(StubSource { remaining: 7 }, &options);
        assert_eq!(drain(&mut lexer).expect("under limit"), 7);
        assert_eq!(lexer.token_count(), 7);
        assert!(!lexer.rejected());

        // Draining past EOF keeps returning EOF without counting.
        assert!(lexer.advance().expect("eof").kind.is_eof());
        assert_eq!(lexer.token_count(), 7);
    }

    #[test]
    fn fail_fast_aborts_on_the_exceeding_token() {
        let options = MaxTokensOptions::new().with_limit(3);
        let mut lexer = MaxTokensLexer::new(StubSource { remaining: 10 }, &options);
        let error = drain(&mut lexer).expect_err("should abort");
        assert_eq!(error.to_string(), "Syntax Error: Token limit of 3 exceeded.");
        // Counting stopped at limit + 1: the abort preempts further advances.
        assert_eq!(lexer.token_count(), 4);
    }

    #[test]
    fn finish_parsing_only_counts() {
        let options = MaxTokensOptions::new().with_limit(3).with_finish_parsing(true);
        let mut lexer = MaxTokensLexer::new(StubSource { remaining: 10 }, &options);
        assert_eq!(drain(&mut lexer).expect("no mid-stream enforcement"), 10);
        assert_eq!(lexer.token_count(), 10);
        assert!(!lexer.rejected());
    }

    #[test]
    fn silent_rejection_latches_once() {
        let rejects = Arc::new(AtomicUsize::new(0));
        let rejects_cb = Arc::clone(&rejects);
        let options = MaxTokensOptions::new()
            .with_limit(2)
            .with_propagate_on_rejection(false)
            .on_reject(move |_| {
                rejects_cb.fetch_add(1, Ordering::SeqCst);
            });

        let mut lexer = MaxTokensLexer::new(StubSource { remaining: 10 }, &options);
        assert_eq!(drain(&mut lexer).expect("silent mode"), 10);
        assert!(lexer.rejected());
        assert_eq!(rejects.load(Ordering::SeqCst), 1);
        assert_eq!(lexer.token_count(), 10);
    }

    #[test]
    fn tokens_pass_through_unchanged() {
        let options = MaxTokensOptions::new().with_limit(100);
        let mut lexer = MaxTokensLexer::new(StubSource { remaining: 1 }, &options);
        let token = lexer.advance().expect("token");
        assert_eq!(token.kind, TokenKind::Name);
        assert_eq!(token.value, "a");
        assert_eq!(lexer.into_inner().remaining, 0);
    }
}
