//! Per-item outcomes for bulk actions, and last-request-wins sequencing.
//!
//! Bulk approval fires one request per booking. [`settle_all`] runs every item
//! and keeps each result, so a partial commit is visible and the failed keys
//! can be retried.
//!
//! Debounced searches can complete out of order. A [`RequestSequencer`] hands
//! out increasing tickets and only the newest one is accepted when its
//! response lands.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::warn;

/// Result of a settle-all batch, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport<K, T, E> {
    pub outcomes: Vec<(K, Result<T, E>)>,
}

impl<K, T, E> BatchReport<K, T, E> {
    pub fn succeeded(&self) -> impl Iterator<Item = (&K, &T)> {
        self.outcomes
            .iter()
            .filter_map(|(key, result)| result.as_ref().ok().map(|value| (key, value)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&K, &E)> {
        self.outcomes
            .iter()
            .filter_map(|(key, result)| result.as_ref().err().map(|error| (key, error)))
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// Some items committed and some did not.
    pub fn is_partial(&self) -> bool {
        self.success_count() > 0 && self.failure_count() > 0
    }

    /// Keys to resubmit.
    pub fn failed_keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.failed().map(|(key, _)| key.clone()).collect()
    }
}

/// Apply `action` to every item without short-circuiting on failure.
pub fn settle_all<I, K, T, E>(
    items: impl IntoIterator<Item = I>,
    mut key_of: impl FnMut(&I) -> K,
    mut action: impl FnMut(I) -> Result<T, E>,
) -> BatchReport<K, T, E> {
    let outcomes: Vec<(K, Result<T, E>)> = items
        .into_iter()
        .map(|item| {
            let key = key_of(&item);
            (key, action(item))
        })
        .collect();

    let failures = outcomes.iter().filter(|(_, r)| r.is_err()).count();
    if failures > 0 {
        warn!(
            failures,
            total = outcomes.len(),
            "bulk action finished with failures"
        );
    }
    BatchReport { outcomes }
}

/// Tag attached to one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Issues tickets and accepts only the most recently issued one.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        RequestSequencer::default()
    }

    /// Start a new request; earlier tickets become stale.
    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether a response tagged with `ticket` may be applied.
    pub fn accept(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest.load(Ordering::Acquire)
    }

    /// Apply `result` via `apply` only if `ticket` is still current.
    pub fn apply_if_current<T>(&self, ticket: RequestTicket, result: T, apply: impl FnOnce(T)) -> bool {
        let current = self.accept(ticket);
        if current {
            apply(result);
        }
        current
    }
}
