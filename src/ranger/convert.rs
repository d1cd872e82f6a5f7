/*!
 * Ranger Format Conversion
 * Bidirectional mapping between Ranger policy documents and internal policies
 */

use crate::authorization::types::{Effect, Policy};
use serde_json::{json, Value};

/// Root prefix used when a Ranger policy carries no path resource.
const ROOT_PREFIX: &str = "/";

/// Resource prefixes from a Ranger `resources.path.{value|values}` field.
fn resource_prefixes(resources: &Value) -> Vec<String> {
    let mut prefixes = Vec::new();
    if let Some(path) = resources.get("path") {
        if let Some(value) = path.get("value").and_then(Value::as_str) {
            prefixes.push(value.to_string());
        }
        if let Some(values) = path.get("values").and_then(Value::as_array) {
            for v in values {
                if let Some(s) = v.as_str() {
                    prefixes.push(s.to_string());
                }
            }
        }
    }
    if prefixes.is_empty() {
        prefixes.push(ROOT_PREFIX.to_string());
    }
    prefixes
}

/// Expand one `policyItems`/`denyPolicyItems` array into internal policies,
/// one per item, all sharing the enclosing policy's resource prefixes.
fn push_items(out: &mut Vec<Policy>, items: &Value, prefixes: &[String], effect: Effect) {
    let Some(items) = items.as_array() else {
        return;
    };
    for item in items {
        let mut policy = Policy::new(format!("ranger-{}", out.len() + 1), effect).with_name(
            item.get("itemName")
                .and_then(Value::as_str)
                .unwrap_or("ranger-policy-item"),
        );
        if let Some(users) = item.get("users").and_then(Value::as_array) {
            for u in users {
                if let Some(s) = u.as_str() {
                    policy.subjects.insert(s.to_string());
                }
            }
        }
        if let Some(accesses) = item.get("accesses").and_then(Value::as_array) {
            for access in accesses {
                if let Some(t) = access.get("type").and_then(Value::as_str) {
                    policy.actions.insert(t.to_lowercase());
                }
            }
        }
        policy.resources = prefixes.to_vec();
        out.push(policy);
    }
}

fn convert_one(out: &mut Vec<Policy>, ranger_policy: &Value) {
    let empty = json!({});
    let resources = ranger_policy.get("resources").unwrap_or(&empty);
    let prefixes = resource_prefixes(resources);
    if let Some(items) = ranger_policy.get("policyItems") {
        push_items(out, items, &prefixes, Effect::Allow);
    }
    if let Some(items) = ranger_policy.get("denyPolicyItems") {
        push_items(out, items, &prefixes, Effect::Deny);
    }
}

/// Convert a Ranger policy document (one policy object or an array of them)
/// into internal policies.
///
/// Each `policyItems` entry becomes one Allow policy and each
/// `denyPolicyItems` entry one Deny policy; subjects come from the item's
/// user list and actions from its lower-cased access types. Ids are assigned
/// from output-list position (`ranger-1`, `ranger-2`, ...) and are NOT
/// stable across separate syncs; callers needing durable identity must
/// derive it themselves.
pub fn policies_from_ranger(document: &Value) -> Vec<Policy> {
    let mut out = Vec::new();
    match document {
        Value::Array(policies) => {
            for p in policies {
                convert_one(&mut out, p);
            }
        }
        Value::Object(_) => convert_one(&mut out, document),
        _ => {}
    }
    out
}

/// Convert internal policies into a Ranger-shaped document, one external
/// policy entry per internal policy.
///
/// Sufficient for inspection and round-trip testing; it does not merge items
/// sharing a resource and is not full external-schema fidelity.
pub fn policies_to_ranger(policies: &[Policy], service_name: &str) -> Value {
    let mut out = Vec::with_capacity(policies.len());
    for policy in policies {
        let name = if policy.name.is_empty() {
            &policy.id
        } else {
            &policy.name
        };
        let mut entry = json!({
            "name": name,
            "service": service_name,
            "resources": {},
        });
        if !policy.resources.is_empty() {
            entry["resources"]["path"] = json!({
                "values": policy.resources,
                "isRecursive": true,
            });
        }
        let accesses: Vec<Value> = policy
            .actions
            .iter()
            .map(|a| json!({"type": a, "isAllowed": policy.effect == Effect::Allow}))
            .collect();
        let item = json!({
            "users": policy.subjects.iter().collect::<Vec<_>>(),
            "accesses": accesses,
        });
        let key = match policy.effect {
            Effect::Allow => "policyItems",
            Effect::Deny => "denyPolicyItems",
        };
        entry[key] = json!([item]);
        out.push(entry);
    }
    Value::Array(out)
}
