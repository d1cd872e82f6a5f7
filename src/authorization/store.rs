/*!
 * Policy Store
 * Guarded policy list with first-match-wins authorization
 */

use crate::authorization::metrics::EvalMetrics;
use crate::authorization::types::{Decision, Effect, Policy};
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;

/// Ordered access-policy list behind a single exclusive guard.
///
/// CRUD and evaluation serialize on the same mutex: a concurrent
/// [`authorize`](Self::authorize) observes either the old or the new list in
/// full, never a mix. [`set_policies`](Self::set_policies) is the only bulk
/// replacement primitive; synchronization results are applied through it.
pub struct PolicyStore {
    policies: Mutex<Vec<Policy>>,
    metrics: Arc<EvalMetrics>,
}

impl PolicyStore {
    /// Create an empty store with its own metrics.
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(EvalMetrics::new()))
    }

    /// Create an empty store sharing an externally owned counter set.
    pub fn with_metrics(metrics: Arc<EvalMetrics>) -> Self {
        Self {
            policies: Mutex::new(Vec::new()),
            metrics,
        }
    }

    /// Replace the entire policy list atomically.
    pub fn set_policies(&self, policies: Vec<Policy>) {
        debug!("replacing policy list ({} policies)", policies.len());
        *self.policies.lock() = policies;
    }

    /// Append a single policy at the end of the list.
    pub fn add_policy(&self, policy: Policy) {
        self.policies.lock().push(policy);
    }

    /// Remove every policy with the given id. Returns whether any was found.
    pub fn remove_policy(&self, id: &str) -> bool {
        let mut policies = self.policies.lock();
        let before = policies.len();
        policies.retain(|p| p.id != id);
        policies.len() != before
    }

    /// Snapshot of the current list, in evaluation order.
    pub fn list_policies(&self) -> Vec<Policy> {
        self.policies.lock().clone()
    }

    /// Number of stored policies.
    pub fn policy_count(&self) -> usize {
        self.policies.lock().len()
    }

    /// Evaluation counters for this store.
    pub fn metrics(&self) -> &EvalMetrics {
        &self.metrics
    }

    /// Decide whether `identity` may perform `action` on `resource_path`.
    ///
    /// An empty policy list is an explicit default-allow; with policies
    /// present, the first match in stored order decides and a miss is a
    /// default-deny. This never returns an error: a misconfigured list reads
    /// as "denied by policy" through the return value.
    pub fn authorize(
        &self,
        identity: &str,
        action: &str,
        resource_path: &str,
        client_ip: Option<&str>,
    ) -> Decision {
        self.metrics.record_evaluation();
        let policies = self.policies.lock();

        // No policies configured: default allow
        if policies.is_empty() {
            self.metrics.record_allow();
            return Decision::allow("", "no_policies_default_allow");
        }

        // First matching policy decides
        for policy in policies.iter() {
            if !policy.matches(identity, action, resource_path, client_ip) {
                continue;
            }
            return match policy.effect {
                Effect::Allow => {
                    self.metrics.record_allow();
                    Decision::allow(policy.id.clone(), "matched_allow_policy")
                }
                Effect::Deny => {
                    self.metrics.record_deny();
                    Decision::deny(policy.id.clone(), "matched_deny_policy")
                }
            };
        }

        // No match: deny by default
        self.metrics.record_deny();
        Decision::deny("", "no_matching_policy")
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new()
    }
}
