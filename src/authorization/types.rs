/*!
 * Policy Types
 * Access-control policy records and authorization decisions
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Subject/action wildcard that matches any value.
pub const WILDCARD: &str = "*";

/// Effect of a matched policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

/// A single access-control policy.
///
/// Policies are evaluated in stored order and the first match decides, so
/// list position is semantically significant. Subjects and actions are sets
/// (exact value or `"*"`); resources are path prefixes matched against the
/// start of the request's resource path; an empty resource list places no
/// restriction. A non-empty `allowed_ip_prefixes` list makes the policy
/// conditional on the client IP: a request without one can never match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subjects: BTreeSet<String>,
    #[serde(default)]
    pub actions: BTreeSet<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_ip_prefixes: Vec<String>,
}

impl Policy {
    /// Create an empty policy with the given id and effect.
    pub fn new(id: impl Into<String>, effect: Effect) -> Self {
        Self {
            id: id.into(),
            effect,
            ..Self::default()
        }
    }

    /// Set the human-readable name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a subject (identity or `"*"`).
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.insert(subject.into());
        self
    }

    /// Add an action (action name or `"*"`).
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.insert(action.into());
        self
    }

    /// Add a resource path prefix.
    pub fn with_resource(mut self, prefix: impl Into<String>) -> Self {
        self.resources.push(prefix.into());
        self
    }

    /// Add an allowed client-IP prefix condition.
    pub fn with_ip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.allowed_ip_prefixes.push(prefix.into());
        self
    }

    /// Subject matches when the set contains the identity or the wildcard.
    pub fn matches_subject(&self, identity: &str) -> bool {
        self.subjects.contains(WILDCARD) || self.subjects.contains(identity)
    }

    /// Action matches when the set contains the action or the wildcard.
    pub fn matches_action(&self, action: &str) -> bool {
        self.actions.contains(WILDCARD) || self.actions.contains(action)
    }

    /// Resource matches when no prefixes are listed, or the path starts with
    /// at least one of them.
    pub fn matches_resource(&self, resource_path: &str) -> bool {
        if self.resources.is_empty() {
            return true;
        }
        self.resources.iter().any(|r| resource_path.starts_with(r))
    }

    /// Conditions match when no IP prefixes are listed, or a client IP is
    /// present and starts with one of them. An IP condition can never be
    /// satisfied by an IP-less request.
    pub fn matches_conditions(&self, client_ip: Option<&str>) -> bool {
        if self.allowed_ip_prefixes.is_empty() {
            return true;
        }
        match client_ip {
            Some(ip) => self.allowed_ip_prefixes.iter().any(|p| ip.starts_with(p)),
            None => false,
        }
    }

    /// Full match against a request.
    pub fn matches(
        &self,
        identity: &str,
        action: &str,
        resource_path: &str,
        client_ip: Option<&str>,
    ) -> bool {
        self.matches_subject(identity)
            && self.matches_action(action)
            && self.matches_resource(resource_path)
            && self.matches_conditions(client_ip)
    }
}

/// Outcome of an authorization check.
///
/// `policy_id` is empty when no policy matched; `reason` is a diagnostic tag
/// for logs and operators, not a stable API surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub policy_id: String,
    pub reason: String,
}

impl Decision {
    pub(crate) fn allow(policy_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            policy_id: policy_id.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn deny(policy_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            policy_id: policy_id.into(),
            reason: reason.into(),
        }
    }

    /// Check if allowed.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Get the diagnostic reason tag.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
