/*!
 * Governance Types
 * Classification profiles and data-handling decisions
 */

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Degree of field obfuscation applied to outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactionLevel {
    #[default]
    None,
    Standard,
    Strict,
}

impl RedactionLevel {
    /// Parse a normalized level name; unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "standard" => Some(Self::Standard),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// Whether governance decisions are enforced or only reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GovernanceMode {
    #[default]
    Enforce,
    Observe,
}

/// Data-handling obligations attached to one classification level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationProfile {
    /// Level name; filled from the configuration map key at load time.
    #[serde(skip)]
    pub level: String,
    pub encryption_required: bool,
    /// Approximate (ANN) search permitted over data at this level.
    pub ann_allowed: bool,
    pub export_allowed: bool,
    pub cache_allowed: bool,
    pub redaction_level: RedactionLevel,
    pub retention_days: u32,
    pub log_encryption: bool,
}

impl Default for ClassificationProfile {
    fn default() -> Self {
        Self {
            level: String::new(),
            encryption_required: false,
            ann_allowed: true,
            export_allowed: true,
            cache_allowed: true,
            redaction_level: RedactionLevel::None,
            retention_days: 365,
            log_encryption: false,
        }
    }
}

impl ClassificationProfile {
    /// Restrictiveness rank used for the fail-closed fallback: one point per
    /// forbidden capability or required protection, redaction weighted by
    /// severity. Higher is more restrictive.
    pub(crate) fn restrictiveness(&self) -> u32 {
        let mut score = 0;
        if self.encryption_required {
            score += 1;
        }
        if !self.ann_allowed {
            score += 1;
        }
        if !self.export_allowed {
            score += 1;
        }
        if !self.cache_allowed {
            score += 1;
        }
        if self.log_encryption {
            score += 1;
        }
        score + self.redaction_level as u32
    }
}

/// Governance decision for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceDecision {
    /// Effective (normalized) classification the decision was made for.
    pub classification: String,
    pub mode: GovernanceMode,
    pub encrypt_logs: bool,
    pub redaction: RedactionLevel,
    pub ann_allowed: bool,
    pub require_content_encryption: bool,
    pub export_allowed: bool,
    pub cache_allowed: bool,
    pub retention_days: u32,
}

/// On-disk governance configuration.
///
/// ```yaml
/// classifications:
///   vs-nfd:
///     encryption_required: false
///     redaction_level: standard
///   geheim:
///     encryption_required: true
///     redaction_level: strict
/// enforcement:
///   default_mode: enforce
///   route_mapping:
///     /vector/search: vs-nfd
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GovernanceConfig {
    #[serde(default)]
    pub classifications: HashMap<String, ClassificationProfile>,
    #[serde(default)]
    pub enforcement: EnforcementConfig,
}

/// `enforcement` section of the governance configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnforcementConfig {
    #[serde(default)]
    pub default_mode: GovernanceMode,
    /// Route name to implied classification level.
    #[serde(default)]
    pub route_mapping: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction_ordering() {
        assert!(RedactionLevel::Strict > RedactionLevel::Standard);
        assert!(RedactionLevel::Standard > RedactionLevel::None);
    }

    #[test]
    fn test_redaction_parse() {
        assert_eq!(RedactionLevel::parse("strict"), Some(RedactionLevel::Strict));
        assert_eq!(RedactionLevel::parse("shredded"), None);
    }

    #[test]
    fn test_profile_defaults_are_permissive() {
        let p = ClassificationProfile::default();
        assert!(p.ann_allowed && p.export_allowed && p.cache_allowed);
        assert!(!p.encryption_required && !p.log_encryption);
        assert_eq!(p.retention_days, 365);
    }

    #[test]
    fn test_restrictiveness_orders_profiles() {
        let open = ClassificationProfile::default();
        let secret = ClassificationProfile {
            encryption_required: true,
            ann_allowed: false,
            export_allowed: false,
            cache_allowed: false,
            redaction_level: RedactionLevel::Strict,
            log_encryption: true,
            ..ClassificationProfile::default()
        };
        assert!(secret.restrictiveness() > open.restrictiveness());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let yaml = r#"
classifications:
  geheim:
    encryption_required: true
"#;
        let config: GovernanceConfig = serde_yaml_ng::from_str(yaml).unwrap();
        let profile = &config.classifications["geheim"];
        assert!(profile.encryption_required);
        assert!(profile.ann_allowed); // unspecified fields keep defaults
        assert_eq!(config.enforcement.default_mode, GovernanceMode::Enforce);
        assert!(config.enforcement.route_mapping.is_empty());
    }
}
