/*!
 * Classification Engine
 * Maps request classifications to data-handling obligations
 */

use crate::governance::audit::{AuditRecord, AuditSink};
use crate::governance::types::{
    ClassificationProfile, GovernanceConfig, GovernanceDecision, GovernanceMode, RedactionLevel,
};
use log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

/// Baseline classification assumed when neither the request nor the route
/// mapping declares one.
pub const DEFAULT_CLASSIFICATION: &str = "vs-nfd";

/// High-sensitivity classification tier.
const STRICT_CLASSES: [&str; 2] = ["geheim", "streng-geheim"];

/// Errors raised while loading governance configuration.
#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("governance config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("governance config is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Classification-to-obligation mapping over an immutable configuration
/// snapshot.
///
/// [`evaluate`](Self::evaluate) is a pure lock-free lookup and never returns
/// an error: unknown classification levels resolve fail-closed to the most
/// restrictive configured profile. Reloading takes `&mut self` — it is an
/// administrator-serialized operation, never concurrent with evaluation.
pub struct ClassificationEngine {
    profiles: HashMap<String, ClassificationProfile>,
    route_mapping: HashMap<String, String>,
    default_mode: GovernanceMode,
    /// Most restrictive configured level, precomputed at load time.
    fallback_level: Option<String>,
    audit: Option<Arc<dyn AuditSink>>,
}

/// Trim and lowercase a classification, mode, or header value.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Most restrictive configured level; ties break toward the
/// lexicographically smaller name so the result is deterministic.
fn most_restrictive(profiles: &HashMap<String, ClassificationProfile>) -> Option<String> {
    let mut names: Vec<&String> = profiles.keys().collect();
    names.sort();
    let mut best: Option<(&String, u32)> = None;
    for name in names {
        let score = profiles[name].restrictiveness();
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((name, score));
        }
    }
    best.map(|(name, _)| name.clone())
}

impl ClassificationEngine {
    /// Engine with no profiles: every evaluation uses the built-in
    /// strict/non-strict heuristic defaults.
    pub fn new() -> Self {
        Self::from_config(GovernanceConfig::default())
    }

    /// Build from an in-memory configuration. Level names and route-implied
    /// levels are normalized once here.
    pub fn from_config(config: GovernanceConfig) -> Self {
        let mut profiles = HashMap::with_capacity(config.classifications.len());
        for (level, mut profile) in config.classifications {
            let key = normalize(&level);
            profile.level = key.clone();
            profiles.insert(key, profile);
        }
        let route_mapping = config
            .enforcement
            .route_mapping
            .into_iter()
            .map(|(route, level)| (route, normalize(&level)))
            .collect();
        let fallback_level = most_restrictive(&profiles);
        Self {
            profiles,
            route_mapping,
            default_mode: config.enforcement.default_mode,
            fallback_level,
            audit: None,
        }
    }

    /// Load the configuration snapshot from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, GovernanceError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: GovernanceConfig = serde_yaml_ng::from_str(&text)?;
        let engine = Self::from_config(config);
        info!(
            "loaded governance config from {}: {} classifications, {} route mappings",
            path.display(),
            engine.profiles.len(),
            engine.route_mapping.len()
        );
        Ok(engine)
    }

    /// Replace the configuration snapshot. Administrator-serialized: the
    /// exclusive borrow guarantees no evaluation runs concurrently.
    pub fn reload_from_yaml_file(&mut self, path: impl AsRef<Path>) -> Result<(), GovernanceError> {
        let mut reloaded = Self::from_yaml_file(path)?;
        reloaded.audit = self.audit.take();
        *self = reloaded;
        Ok(())
    }

    /// Attach an audit sink; records are emitted for enforce-mode decisions.
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    pub fn set_audit_sink(&mut self, sink: Arc<dyn AuditSink>) {
        self.audit = Some(sink);
    }

    /// Look up a profile by (case-insensitive) level name.
    pub fn profile(&self, level: &str) -> Option<&ClassificationProfile> {
        self.profiles.get(&normalize(level))
    }

    /// Whether a classification belongs to the high-sensitivity tier.
    pub fn is_strict_class(level: &str) -> bool {
        let c = normalize(level);
        STRICT_CLASSES.iter().any(|s| *s == c)
    }

    /// Decide the data-handling obligations for one request.
    ///
    /// The effective classification is the `X-Classification` header, else
    /// the route-implied level, else [`DEFAULT_CLASSIFICATION`]. Unknown
    /// levels resolve to the most restrictive configured profile — never to
    /// a permissive default. In enforce mode one audit record is emitted per
    /// call when a sink is attached; a sink failure is logged and the
    /// decision is returned unchanged.
    pub fn evaluate(
        &self,
        headers: &HashMap<String, String>,
        route: &str,
    ) -> GovernanceDecision {
        let header = |key: &str| headers.get(key).map(String::as_str).unwrap_or("");

        let mut classification = normalize(header("X-Classification"));
        if classification.is_empty() {
            classification = self
                .route_mapping
                .get(route)
                .cloned()
                .unwrap_or_else(|| DEFAULT_CLASSIFICATION.to_string());
        }

        let mode = if normalize(header("X-Governance-Mode")) == "observe" {
            GovernanceMode::Observe
        } else {
            self.default_mode
        };

        let mut decision = match self.lookup(&classification) {
            Some(profile) => GovernanceDecision {
                classification: classification.clone(),
                mode,
                encrypt_logs: profile.log_encryption,
                redaction: profile.redaction_level,
                ann_allowed: profile.ann_allowed,
                require_content_encryption: profile.encryption_required,
                export_allowed: profile.export_allowed,
                cache_allowed: profile.cache_allowed,
                retention_days: profile.retention_days,
            },
            None => {
                // Nothing configured at all: strict/non-strict heuristic
                let strict = Self::is_strict_class(&classification);
                GovernanceDecision {
                    classification: classification.clone(),
                    mode,
                    encrypt_logs: strict,
                    redaction: if strict {
                        RedactionLevel::Strict
                    } else {
                        RedactionLevel::Standard
                    },
                    ann_allowed: !strict,
                    require_content_encryption: strict,
                    export_allowed: !strict,
                    cache_allowed: !strict,
                    retention_days: 365,
                }
            }
        };

        // Per-request overrides
        match normalize(header("X-Encrypt-Logs")).as_str() {
            "true" | "1" | "yes" => decision.encrypt_logs = true,
            "false" | "0" | "no" => decision.encrypt_logs = false,
            _ => {}
        }
        if let Some(redaction) = RedactionLevel::parse(&normalize(header("X-Redaction-Level"))) {
            decision.redaction = redaction;
        }

        if decision.mode == GovernanceMode::Enforce {
            if let Some(sink) = &self.audit {
                let record = AuditRecord {
                    route: route.to_string(),
                    classification: decision.classification.clone(),
                    mode: decision.mode,
                    require_content_encryption: decision.require_content_encryption,
                    encrypt_logs: decision.encrypt_logs,
                    redaction: decision.redaction,
                    retention_days: decision.retention_days,
                    user_id: headers.get("X-User-Id").cloned(),
                    recorded_at: SystemTime::now(),
                };
                if let Err(e) = sink.record(&record) {
                    warn!("audit record for route {} dropped: {}", route, e);
                }
            }
        }

        decision
    }

    /// Profile for a normalized level, falling back fail-closed to the most
    /// restrictive configured profile.
    fn lookup(&self, classification: &str) -> Option<&ClassificationProfile> {
        if let Some(profile) = self.profiles.get(classification) {
            return Some(profile);
        }
        let fallback = self.fallback_level.as_deref()?;
        warn!(
            "unknown classification '{}', using most restrictive profile '{}'",
            classification, fallback
        );
        self.profiles.get(fallback)
    }
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new()
    }
}
