//! Enforcement policy: accept or reject a count against a configuration.

use gqlguard_parser::ParseError;

use crate::config::{MaxTokensOptions, ParseOutcome};
use crate::instrumentation;

/// Construct the mode-appropriate rejection error.
///
/// Fail-fast mode stopped counting at the limit, so it cannot report an
/// exact count; finish-parsing mode reports both the limit and the count.
pub(crate) fn token_limit_error(config: &MaxTokensOptions, token_count: usize) -> ParseError {
    ParseError::TokenLimitExceeded {
        limit: config.limit,
        found: config.finish_parsing.then_some(token_count),
    }
}

/// Evaluate the token count against the configured limit.
///
/// Over the limit: fires `on_reject` observers in registration order and,
/// when `propagate_on_rejection` is set, returns the rejection error. At or
/// under the limit: fires `on_accept` observers — finish-parsing mode only,
/// since in fail-fast mode this function runs once per token and acceptance
/// is not an outcome until the stream ends.
///
/// The function is pure apart from observer dispatch and the process-local
/// counters; callers are responsible for invoking it at most once per parse
/// on the rejection path.
pub fn process_parse_outcome(
    config: &MaxTokensOptions,
    token_count: usize,
) -> Result<(), ParseError> {
    if token_count > config.limit {
        let error = token_limit_error(config, token_count);
        instrumentation::record_rejection();
        tracing::warn!(
            target: "gqlguard.max_tokens",
            limit = config.limit,
            token_count,
            finish_parsing = config.finish_parsing,
            "token limit exceeded"
        );
        for callback in &config.on_reject {
            callback(&error);
        }
        if config.propagate_on_rejection {
            return Err(error);
        }
        return Ok(());
    }

    if config.finish_parsing {
        instrumentation::record_acceptance();
        let outcome = ParseOutcome { token_count };
        for callback in &config.on_accept {
            callback(&outcome);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    fn counting_options(
        limit: usize,
        finish_parsing: bool,
    ) -> (MaxTokensOptions, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let accepts = Arc::new(AtomicUsize::new(0));
        let rejects = Arc::new(AtomicUsize::new(0));
        let accepts_cb = Arc::clone(&accepts);
        let rejects_cb = Arc::clone(&rejects);
        let options = MaxTokensOptions::new()
            .with_limit(limit)
            .with_finish_parsing(finish_parsing)
            .on_accept(move |_| {
                accepts_cb.fetch_add(1, Ordering::SeqCst);
            })
            .on_reject(move |_| {
                rejects_cb.fetch_add(1, Ordering::SeqCst);
            });
        (options, accepts, rejects)
    }

    #[test]
    fn under_limit_fail_fast_is_a_no_op() {
        let (options, accepts, rejects) = counting_options(10, false);
        assert!(process_parse_outcome(&options, 5).is_ok());
        assert_eq!(accepts.load(Ordering::SeqCst), 0);
        assert_eq!(rejects.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn under_limit_finish_parsing_fires_accept() {
        let (options, accepts, rejects) = counting_options(10, true);
        assert!(process_parse_outcome(&options, 10).is_ok());
        assert_eq!(accepts.load(Ordering::SeqCst), 1);
        assert_eq!(rejects.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn over_limit_rejects_with_mode_appropriate_message() {
        let (options, accepts, rejects) = counting_options(10, false);
        let error = process_parse_outcome(&options, 11).expect_err("should reject");
        assert_eq!(error.to_string(), "Syntax Error: Token limit of 10 exceeded.");
        assert_eq!(rejects.load(Ordering::SeqCst), 1);
        assert_eq!(accepts.load(Ordering::SeqCst), 0);

        let (options, _, _) = counting_options(10, true);
        let error = process_parse_outcome(&options, 37).expect_err("should reject");
        assert_eq!(
            error.to_string(),
            "Syntax Error: Token limit of 10 exceeded, found 37."
        );
    }

    #[test]
    fn rejection_without_propagation_returns_ok() {
        let (options, accepts, rejects) = counting_options(2, false);
        let options = options.with_propagate_on_rejection(false);
        assert!(process_parse_outcome(&options, 3).is_ok());
        assert_eq!(rejects.load(Ordering::SeqCst), 1);
        assert_eq!(accepts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn observers_fire_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&order);
        let second = Arc::clone(&order);
        let options = MaxTokensOptions::new()
            .with_limit(1)
            .on_reject(move |_| first.lock().expect("lock").push("first"))
            .on_reject(move |_| second.lock().expect("lock").push("second"));

        let _ = process_parse_outcome(&options, 2);
        assert_eq!(*order.lock().expect("lock"), vec!["first", "second"]);
    }

    #[test]
    fn accept_payload_carries_exact_count() {
        let seen = Arc::new(AtomicUsize::new(usize::MAX));
        let seen_cb = Arc::clone(&seen);
        let options = MaxTokensOptions::new()
            .with_limit(100)
            .with_finish_parsing(true)
            .on_accept(move |outcome| {
                seen_cb.store(outcome.token_count, Ordering::SeqCst);
            });

        assert!(process_parse_outcome(&options, 42).is_ok());
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }
}
