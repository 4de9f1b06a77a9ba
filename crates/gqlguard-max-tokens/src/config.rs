//! Guard configuration: limit, enforcement mode, and observer callbacks.

use std::fmt;

use gqlguard_parser::ParseError;

/// Token ceiling applied when the caller does not override it.
pub const DEFAULT_TOKEN_LIMIT: usize = 1000;

/// Payload handed to accept observers when a document passes the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Exact number of non-EOF tokens the lexer produced.
    pub token_count: usize,
}

/// Observer invoked when a document is accepted (finish-parsing mode only).
pub type AcceptCallback = Box<dyn Fn(&ParseOutcome) + Send + Sync>;

/// Observer invoked when a document is rejected for exceeding the limit.
pub type RejectCallback = Box<dyn Fn(&ParseError) + Send + Sync>;

/// Immutable per-parse configuration of the token-limit guard.
///
/// Built once per parse invocation by layering builder calls over
/// [`MaxTokensOptions::default`]; read-only thereafter. Observers fire in
/// registration order, at most once per parse, and never both kinds for the
/// same parse.
pub struct MaxTokensOptions {
    /// Maximum number of tokens a document may produce.
    pub limit: usize,
    /// `false`: abort at the first exceeding token (fail-fast).
    /// `true`: count the whole stream, then enforce once.
    pub finish_parsing: bool,
    /// Whether a rejection is returned to the caller as an error, or only
    /// reported to `on_reject` observers.
    pub propagate_on_rejection: bool,
    /// Acceptance observers, in registration order.
    pub on_accept: Vec<AcceptCallback>,
    /// Rejection observers, in registration order.
    pub on_reject: Vec<RejectCallback>,
}

impl Default for MaxTokensOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_TOKEN_LIMIT,
            finish_parsing: false,
            propagate_on_rejection: true,
            on_accept: Vec::new(),
            on_reject: Vec::new(),
        }
    }
}

impl MaxTokensOptions {
    /// Construct the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the token ceiling.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Select finish-parsing enforcement (count everything, enforce once).
    #[must_use]
    pub fn with_finish_parsing(mut self, finish_parsing: bool) -> Self {
        self.finish_parsing = finish_parsing;
        self
    }

    /// Select whether rejections propagate to the caller as errors.
    #[must_use]
    pub fn with_propagate_on_rejection(mut self, propagate: bool) -> Self {
        self.propagate_on_rejection = propagate;
        self
    }

    /// Register an acceptance observer.
    #[must_use]
    pub fn on_accept(mut self, callback: impl Fn(&ParseOutcome) + Send + Sync + 'static) -> Self {
        self.on_accept.push(Box::new(callback));
        self
    }

    /// Register a rejection observer.
    #[must_use]
    pub fn on_reject(mut self, callback: impl Fn(&ParseError) + Send + Sync + 'static) -> Self {
        self.on_reject.push(Box::new(callback));
        self
    }
}

impl fmt::Debug for MaxTokensOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaxTokensOptions")
            .field("limit", &self.limit)
            .field("finish_parsing", &self.finish_parsing)
            .field("propagate_on_rejection", &self.propagate_on_rejection)
            .field("on_accept", &format_args!("[{} callbacks]", self.on_accept.len()))
            .field("on_reject", &format_args!("[{} callbacks]", self.on_reject.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let options = MaxTokensOptions::default();
        assert_eq!(options.limit, 1000);
        assert!(!options.finish_parsing);
        assert!(options.propagate_on_rejection);
        assert!(options.on_accept.is_empty());
        assert!(options.on_reject.is_empty());
    }

    #[test]
    fn builder_layers_overrides_onto_defaults() {
        let options = MaxTokensOptions::new()
            .with_limit(4)
            .with_finish_parsing(true)
            .with_propagate_on_rejection(false)
            .on_accept(|_| {})
            .on_reject(|_| {})
            .on_reject(|_| {});
        assert_eq!(options.limit, 4);
        assert!(options.finish_parsing);
        assert!(!options.propagate_on_rejection);
        assert_eq!(options.on_accept.len(), 1);
        assert_eq!(options.on_reject.len(), 2);
    }

    #[test]
    fn debug_elides_callback_bodies() {
        let options = MaxTokensOptions::new().on_reject(|_| {});
        let rendered = format!("{options:?}");
        assert!(rendered.contains("limit: 1000"));
        assert!(rendered.contains("[1 callbacks]"));
    }
}
