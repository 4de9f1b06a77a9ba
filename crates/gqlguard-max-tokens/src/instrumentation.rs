//! Guard observability counters.
//!
//! Process-local totals for accepted and rejected parses, exposed as a
//! snapshot for metrics scrapes. Per-document data never leaves the parse
//! call; only the running totals are kept.

use std::sync::atomic::{AtomicU64, Ordering};

static ACCEPTED_TOTAL: AtomicU64 = AtomicU64::new(0);
static REJECTED_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Snapshot of guard observability counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaxTokensMetricsSnapshot {
    /// Parses accepted by the enforcement policy.
    pub accepted_total: u64,
    /// Parses rejected for exceeding the token limit.
    pub rejected_total: u64,
}

pub(crate) fn record_acceptance() {
    ACCEPTED_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_rejection() {
    REJECTED_TOTAL.fetch_add(1, Ordering::Relaxed);
}

/// Return a snapshot of the guard counters.
#[must_use]
pub fn max_tokens_metrics_snapshot() -> MaxTokensMetricsSnapshot {
    MaxTokensMetricsSnapshot {
        accepted_total: ACCEPTED_TOTAL.load(Ordering::Relaxed),
        rejected_total: REJECTED_TOTAL.load(Ordering::Relaxed),
    }
}

/// Reset the guard counters.
pub fn reset_max_tokens_metrics() {
    ACCEPTED_TOTAL.store(0, Ordering::Relaxed);
    REJECTED_TOTAL.store(0, Ordering::Relaxed);
}
