/*!
 * Authgov
 * Policy evaluation and data-governance core for a multi-tenant database service
 *
 * Two independent decision surfaces gate every request the service handles:
 *
 * - [`PolicyStore::authorize`] answers "may this identity perform this action
 *   on this resource" against an ordered access-policy list (default-allow
 *   when no policies are configured, default-deny when none match).
 * - [`ClassificationEngine::evaluate`] answers "which data-handling
 *   obligations apply" based on the sensitivity classification of the route
 *   (fail-closed: unknown classifications resolve to the most restrictive
 *   configured profile).
 *
 * The [`ranger`] module synchronizes the policy list with an external
 * Ranger-compatible policy authority; its output is applied through
 * [`PolicyStore::set_policies`], the sole atomic whole-list replacement.
 */

pub mod authorization;
pub mod governance;
pub mod ranger;

// Re-export commonly used items
pub use authorization::{
    Decision, Effect, EvalMetrics, MetricsSnapshot, Policy, PolicyFileError, PolicyStore,
};
pub use governance::{
    AuditError, AuditRecord, AuditSink, AuditStats, ClassificationEngine, ClassificationProfile,
    GovernanceConfig, GovernanceDecision, GovernanceError, GovernanceMode, MemoryAuditSink,
    RedactionLevel,
};
pub use ranger::{policies_from_ranger, policies_to_ranger, RangerClient, RangerConfig, RangerError};
