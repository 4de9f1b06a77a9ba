//! End-to-end behavior of the token-limit guard around real documents.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use gqlguard_max_tokens::{
    MaxTokensLexer, MaxTokensOptions, max_tokens_metrics_snapshot, max_tokens_parse_fn,
    parse_with_token_limit,
};
use gqlguard_parser::{Lexer, ParseError, ParseOptions, Parser, parse};

/// A document of `n` flat fields, producing exactly `n + 2` lexical tokens
/// (the two braces plus one name per field).
fn document_with_fields(n: usize) -> String {
    let mut src = String::with_capacity(2 * n + 4);
    src.push('{');
    for _ in 0..n {
        src.push_str(" a");
    }
    src.push_str(" }");
    src
}

fn guarded(source: &str, config: &MaxTokensOptions) -> Result<gqlguard_ast::Document, ParseError> {
    parse_with_token_limit(source, &ParseOptions::default(), config)
}

fn counter_pair() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    (
        Arc::new(AtomicUsize::new(0)),
        Arc::new(AtomicUsize::new(0)),
    )
}

fn with_counters(
    config: MaxTokensOptions,
    accepts: &Arc<AtomicUsize>,
    rejects: &Arc<AtomicUsize>,
) -> MaxTokensOptions {
    let accepts = Arc::clone(accepts);
    let rejects = Arc::clone(rejects);
    config
        .on_accept(move |_| {
            accepts.fetch_add(1, Ordering::SeqCst);
        })
        .on_reject(move |_| {
            rejects.fetch_add(1, Ordering::SeqCst);
        })
}

#[test]
fn default_limit_rejects_oversized_document() {
    // 999 fields -> 1001 tokens, one over the default ceiling of 1000.
    let src = document_with_fields(999);
    let error = guarded(&src, &MaxTokensOptions::default()).expect_err("should reject");
    assert_eq!(error.to_string(), "Syntax Error: Token limit of 1000 exceeded.");
    assert!(error.is_token_limit());
}

#[test]
fn default_limit_accepts_document_under_the_ceiling() {
    // 996 fields -> 998 tokens.
    let src = document_with_fields(996);
    let doc = guarded(&src, &MaxTokensOptions::default()).expect("should accept");
    assert_eq!(doc.definitions.len(), 1);
}

#[test]
fn custom_limit_rejects_and_notifies_once() {
    let (accepts, rejects) = counter_pair();
    let config = with_counters(MaxTokensOptions::new().with_limit(4), &accepts, &rejects);

    // "{ a a a }" -> 5 tokens.
    let error = guarded(&document_with_fields(3), &config).expect_err("should reject");
    assert_eq!(error.to_string(), "Syntax Error: Token limit of 4 exceeded.");
    assert_eq!(rejects.load(Ordering::SeqCst), 1);
    assert_eq!(accepts.load(Ordering::SeqCst), 0);
}

#[test]
fn custom_limit_accepts_smaller_document() {
    let config = MaxTokensOptions::new().with_limit(4);
    assert!(guarded(&document_with_fields(1), &config).is_ok());
}

#[test]
fn finish_parsing_rejects_once_with_exact_count() {
    let (accepts, rejects) = counter_pair();
    let config = with_counters(
        MaxTokensOptions::new().with_limit(4).with_finish_parsing(true),
        &accepts,
        &rejects,
    );

    let error = guarded(&document_with_fields(3), &config).expect_err("should reject");
    assert_eq!(
        error.to_string(),
        "Syntax Error: Token limit of 4 exceeded, found 5."
    );
    assert_eq!(rejects.load(Ordering::SeqCst), 1);
    assert_eq!(accepts.load(Ordering::SeqCst), 0);
}

#[test]
fn finish_parsing_accepts_once_with_exact_count() {
    let seen = Arc::new(AtomicUsize::new(usize::MAX));
    let calls = Arc::new(AtomicUsize::new(0));
    let seen_cb = Arc::clone(&seen);
    let calls_cb = Arc::clone(&calls);
    let config = MaxTokensOptions::new()
        .with_limit(4)
        .with_finish_parsing(true)
        .on_accept(move |outcome| {
            calls_cb.fetch_add(1, Ordering::SeqCst);
            seen_cb.store(outcome.token_count, Ordering::SeqCst);
        });

    // "{ a }" -> 3 tokens.
    assert!(guarded(&document_with_fields(1), &config).is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[test]
fn fail_fast_success_fires_no_observers() {
    let (accepts, rejects) = counter_pair();
    let config = with_counters(MaxTokensOptions::new().with_limit(100), &accepts, &rejects);

    assert!(guarded("{ hero { name } }", &config).is_ok());
    assert_eq!(accepts.load(Ordering::SeqCst), 0);
    assert_eq!(rejects.load(Ordering::SeqCst), 0);
}

#[test]
fn fail_fast_aborts_at_limit_plus_one() {
    let config = MaxTokensOptions::new().with_limit(4);
    let src = document_with_fields(100);
    let counting = MaxTokensLexer::new(Lexer::new(&src), &config);
    let mut parser = Parser::new(counting);

    let error = parser.parse_document().expect_err("should abort mid-stream");
    assert!(error.is_token_limit());
    // The rejection happened exactly on the (limit + 1)-th token; the rest
    // of the 102-token document was never lexed.
    assert_eq!(parser.tokens().token_count(), 5);
}

#[test]
fn silent_fail_fast_returns_document_and_notifies_once() {
    let (accepts, rejects) = counter_pair();
    let config = with_counters(
        MaxTokensOptions::new()
            .with_limit(4)
            .with_propagate_on_rejection(false),
        &accepts,
        &rejects,
    );

    let doc = guarded(&document_with_fields(50), &config).expect("silent mode returns the document");
    assert_eq!(doc.definitions.len(), 1);
    assert_eq!(rejects.load(Ordering::SeqCst), 1);
    assert_eq!(accepts.load(Ordering::SeqCst), 0);
}

#[test]
fn silent_finish_parsing_returns_document() {
    let (accepts, rejects) = counter_pair();
    let config = with_counters(
        MaxTokensOptions::new()
            .with_limit(4)
            .with_finish_parsing(true)
            .with_propagate_on_rejection(false),
        &accepts,
        &rejects,
    );

    assert!(guarded(&document_with_fields(10), &config).is_ok());
    assert_eq!(rejects.load(Ordering::SeqCst), 1);
    assert_eq!(accepts.load(Ordering::SeqCst), 0);
}

#[test]
fn grammar_error_in_finish_mode_still_evaluates_policy() {
    // Unclosed selection set: the parser consumes "{", "a" (2 tokens) and
    // fails. Under the limit, the acceptance observer still fires and the
    // grammar error is returned.
    let (accepts, rejects) = counter_pair();
    let config = with_counters(
        MaxTokensOptions::new().with_limit(10).with_finish_parsing(true),
        &accepts,
        &rejects,
    );

    let error = guarded("{ a", &config).expect_err("grammar error");
    assert!(!error.is_token_limit());
    assert_eq!(accepts.load(Ordering::SeqCst), 1);
    assert_eq!(rejects.load(Ordering::SeqCst), 0);
}

#[test]
fn grammar_error_in_finish_mode_over_limit_prefers_token_limit_error() {
    let (accepts, rejects) = counter_pair();
    let config = with_counters(
        MaxTokensOptions::new().with_limit(1).with_finish_parsing(true),
        &accepts,
        &rejects,
    );

    let error = guarded("{ a", &config).expect_err("should reject");
    assert_eq!(error.to_string(), "Syntax Error: Token limit of 1 exceeded, found 2.");
    assert_eq!(rejects.load(Ordering::SeqCst), 1);
    assert_eq!(accepts.load(Ordering::SeqCst), 0);
}

#[test]
fn interceptor_is_transparent_to_parsing() {
    let src = "
        query Hero($ep: Episode = JEDI) {
            hero(episode: $ep) @include(if: true) {
                name
                ... on Droid { primaryFunction }
                ...Friends
            }
        }
        fragment Friends on Character { friends { name } }
    ";
    let plain = parse(src).expect("plain parse");
    let config = MaxTokensOptions::new().with_limit(10_000);
    let guarded_doc = guarded(src, &config).expect("guarded parse");
    assert_eq!(plain, guarded_doc);
}

#[test]
fn parse_fn_registration_point_applies_config() {
    let parse_fn = max_tokens_parse_fn(MaxTokensOptions::new().with_limit(4));

    assert!(parse_fn("{ a }").is_ok());
    let error = parse_fn("{ a a a }").expect_err("should reject");
    assert_eq!(error.to_string(), "Syntax Error: Token limit of 4 exceeded.");

    // The registration point must be shareable across request handlers.
    fn assert_send_sync<T: Send + Sync>(_: &T) {}
    assert_send_sync(&parse_fn);
}

#[test]
fn eof_is_never_counted() {
    // Exactly at the limit: 3 fields -> 5 tokens, limit 5. If EOF were
    // counted the guard would see 6 and reject.
    let config = MaxTokensOptions::new().with_limit(5);
    assert!(guarded(&document_with_fields(3), &config).is_ok());
}

#[test]
fn ignored_source_elements_are_never_counted() {
    let config = MaxTokensOptions::new().with_limit(3);
    let src = "# comment\n{ a, }\n# trailing";
    assert!(guarded(src, &config).is_ok());
}

#[test]
fn guard_counters_advance_on_rejection() {
    let before = max_tokens_metrics_snapshot();
    let _ = guarded(&document_with_fields(10), &MaxTokensOptions::new().with_limit(2));
    let after = max_tokens_metrics_snapshot();
    assert!(after.rejected_total >= before.rejected_total + 1);
}

mod boundary {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        /// A limit of exactly the document's token count accepts; one less
        /// rejects with the fail-fast message.
        #[test]
        fn limit_boundary_is_exact(fields in 1usize..80) {
            let src = document_with_fields(fields);
            let total = fields + 2;

            let at_limit = MaxTokensOptions::new().with_limit(total);
            prop_assert!(guarded(&src, &at_limit).is_ok());

            let under = MaxTokensOptions::new().with_limit(total - 1);
            let error = guarded(&src, &under).expect_err("must reject");
            prop_assert_eq!(
                error.to_string(),
                format!("Syntax Error: Token limit of {} exceeded.", total - 1)
            );
        }

        /// Finish-parsing mode always reports the exact total.
        #[test]
        fn finish_parsing_reports_exact_total(fields in 1usize..80) {
            let src = document_with_fields(fields);
            let total = fields + 2;

            let config = MaxTokensOptions::new().with_limit(1).with_finish_parsing(true);
            let error = guarded(&src, &config).expect_err("must reject");
            prop_assert_eq!(
                error.to_string(),
                format!("Syntax Error: Token limit of 1 exceeded, found {total}.")
            );
        }
    }
}
