/*!
 * Policy Persistence
 * JSON/YAML policy-file loading and JSON saving
 */

use crate::authorization::store::PolicyStore;
use crate::authorization::types::Policy;
use log::{info, warn};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or saving a policy file.
///
/// Malformed individual entries are not errors (they are skipped with a
/// warning); only I/O failures and structurally unrecognized documents fail
/// the call.
#[derive(Debug, Error)]
pub enum PolicyFileError {
    #[error("policy file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("policy file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("policy file is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("unsupported document structure: {0}")]
    UnsupportedStructure(&'static str),
}

/// Extract the policy sequence from a parsed JSON document.
///
/// Accepts a bare array or a `{"policies": [...]}` wrapper; anything else is
/// an unrecognized structure and fails the whole load.
fn json_entries(doc: serde_json::Value) -> Result<Vec<serde_json::Value>, PolicyFileError> {
    match doc {
        serde_json::Value::Array(entries) => Ok(entries),
        serde_json::Value::Object(mut map) => match map.remove("policies") {
            Some(serde_json::Value::Array(entries)) => Ok(entries),
            _ => Err(PolicyFileError::UnsupportedStructure(
                "expected a JSON array or {\"policies\": [...]}",
            )),
        },
        _ => Err(PolicyFileError::UnsupportedStructure(
            "expected a JSON array or {\"policies\": [...]}",
        )),
    }
}

/// Extract the policy sequence from a parsed YAML document.
fn yaml_entries(doc: serde_yaml_ng::Value) -> Result<Vec<serde_yaml_ng::Value>, PolicyFileError> {
    let key = serde_yaml_ng::Value::String("policies".to_string());
    match doc {
        serde_yaml_ng::Value::Sequence(entries) => Ok(entries),
        serde_yaml_ng::Value::Mapping(mut map) => match map.remove(&key) {
            Some(serde_yaml_ng::Value::Sequence(entries)) => Ok(entries),
            _ => Err(PolicyFileError::UnsupportedStructure(
                "expected a YAML sequence or {policies: [...]}",
            )),
        },
        _ => Err(PolicyFileError::UnsupportedStructure(
            "expected a YAML sequence or {policies: [...]}",
        )),
    }
}

/// Parse a JSON policy document, skipping malformed entries.
pub(crate) fn parse_policies_json(text: &str) -> Result<Vec<Policy>, PolicyFileError> {
    let doc: serde_json::Value = serde_json::from_str(text)?;
    let entries = json_entries(doc)?;
    let mut policies = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Policy>(entry) {
            Ok(p) => policies.push(p),
            Err(e) => warn!("skipping malformed policy entry {}: {}", idx, e),
        }
    }
    Ok(policies)
}

/// Parse a YAML policy document, skipping malformed entries.
pub(crate) fn parse_policies_yaml(text: &str) -> Result<Vec<Policy>, PolicyFileError> {
    let doc: serde_yaml_ng::Value = serde_yaml_ng::from_str(text)?;
    let entries = yaml_entries(doc)?;
    let mut policies = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        match serde_yaml_ng::from_value::<Policy>(entry) {
            Ok(p) => policies.push(p),
            Err(e) => warn!("skipping malformed policy entry {}: {}", idx, e),
        }
    }
    Ok(policies)
}

fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

impl PolicyStore {
    /// Load policies from a JSON or YAML file (detected by extension) and
    /// replace the current list atomically.
    ///
    /// Returns the number of policies loaded. Malformed individual entries
    /// are skipped, so a partial load succeeds; a document whose overall
    /// structure is unrecognized fails without touching the current list.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<usize, PolicyFileError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let policies = if is_yaml_path(path) {
            parse_policies_yaml(&text)?
        } else {
            parse_policies_json(&text)?
        };
        let count = policies.len();
        self.set_policies(policies);
        info!("loaded {} policies from {}", count, path.display());
        Ok(count)
    }

    /// Save the current policy list as a JSON array, regardless of the
    /// format it was loaded from.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), PolicyFileError> {
        let list = self.list_policies();
        let text = serde_json::to_string_pretty(&list)?;
        fs::write(path.as_ref(), text)?;
        Ok(())
    }
}
