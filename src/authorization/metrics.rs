/*!
 * Evaluation Metrics
 * Monotonic counters for authorization decisions
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters for authorization evaluation.
///
/// The counters are independent of the policy-list guard and are updated
/// without coordination; every [`authorize`](crate::PolicyStore::authorize)
/// call increments `evaluations` and exactly one of `allows`/`denies`.
/// Owned by the store by default, injectable for shared export.
#[derive(Debug, Default)]
pub struct EvalMetrics {
    evaluations: AtomicU64,
    allows: AtomicU64,
    denies: AtomicU64,
}

impl EvalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_evaluation(&self) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_allow(&self) {
        self.allows.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_deny(&self) {
        self.denies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    pub fn allows(&self) -> u64 {
        self.allows.load(Ordering::Relaxed)
    }

    pub fn denies(&self) -> u64 {
        self.denies.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            evaluations: self.evaluations(),
            allows: self.allows(),
            denies: self.denies(),
        }
    }
}

/// Serializable counter snapshot for scrape/export endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub evaluations: u64,
    pub allows: u64,
    pub denies: u64,
}
