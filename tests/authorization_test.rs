/*!
 * Authorization Tests
 * End-to-end policy evaluation, atomic replacement, and determinism
 */

use authgov::{Decision, Effect, Policy, PolicyStore};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;

fn hr_policies() -> Vec<Policy> {
    vec![
        Policy::new("allow-metrics-readonly", Effect::Allow)
            .with_name("readonly may read /metrics")
            .with_subject("readonly")
            .with_action("metrics.read")
            .with_resource("/metrics"),
        Policy::new("hr-allow-internal-read", Effect::Allow)
            .with_subject("*")
            .with_action("read")
            .with_resource("/entities/hr:")
            .with_ip_prefix("10.")
            .with_ip_prefix("192.168."),
        Policy::new("hr-deny-external-read", Effect::Deny)
            .with_subject("*")
            .with_action("read")
            .with_resource("/entities/hr:"),
    ]
}

#[test]
fn test_single_policy_allow_and_default_deny() {
    let store = PolicyStore::new();
    store.set_policies(vec![Policy::new("p1", Effect::Allow)
        .with_subject("alice")
        .with_action("read")
        .with_resource("/data")]);

    let alice = store.authorize("alice", "read", "/data/1", None);
    assert_eq!(
        alice,
        Decision {
            allowed: true,
            policy_id: "p1".to_string(),
            reason: "matched_allow_policy".to_string(),
        }
    );

    let bob = store.authorize("bob", "read", "/data/1", None);
    assert!(!bob.is_allowed());
    assert_eq!(bob.policy_id, "");
}

#[test]
fn test_hr_internal_external_split() {
    let store = PolicyStore::new();
    store.set_policies(hr_policies());

    // Internal address reaches the IP-gated allow first
    let internal = store.authorize("anyone", "read", "/entities/hr:7", Some("192.168.1.20"));
    assert!(internal.is_allowed());
    assert_eq!(internal.policy_id, "hr-allow-internal-read");

    // External address fails the IP condition, the deny catches it
    let external = store.authorize("anyone", "read", "/entities/hr:7", Some("203.0.113.9"));
    assert!(!external.is_allowed());
    assert_eq!(external.policy_id, "hr-deny-external-read");

    // No address at all: the IP-gated policy can never match
    let ipless = store.authorize("anyone", "read", "/entities/hr:7", None);
    assert!(!ipless.is_allowed());
    assert_eq!(ipless.policy_id, "hr-deny-external-read");

    // Unrelated action falls through everything
    let unrelated = store.authorize("readonly", "write", "/entities/hr:7", None);
    assert_eq!(unrelated.reason(), "no_matching_policy");
}

/// A replacement mid-flight must hand every authorize call one complete
/// list: with list A (allow-all, id "a") and list B (deny-all, id "b"),
/// every decision must be consistent with exactly one of the two.
#[test]
fn test_set_policies_is_atomic_under_concurrent_authorize() {
    let store = Arc::new(PolicyStore::new());
    let list_a = vec![Policy::new("a", Effect::Allow)
        .with_subject("*")
        .with_action("*")];
    let list_b = vec![Policy::new("b", Effect::Deny)
        .with_subject("*")
        .with_action("*")];
    store.set_policies(list_a.clone());

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for _ in 0..2000 {
                let d = store.authorize("alice", "read", "/data/1", None);
                let consistent_a = d.allowed && d.policy_id == "a";
                let consistent_b = !d.allowed && d.policy_id == "b";
                assert!(
                    consistent_a || consistent_b,
                    "mixed-list decision observed: {:?}",
                    d
                );
            }
        }));
    }

    let swapper = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..500 {
                if i % 2 == 0 {
                    store.set_policies(list_b.clone());
                } else {
                    store.set_policies(list_a.clone());
                }
            }
        })
    };

    for handle in handles {
        handle.join().unwrap();
    }
    swapper.join().unwrap();

    let snap = store.metrics().snapshot();
    assert_eq!(snap.evaluations, 8000);
    assert_eq!(snap.allows + snap.denies, snap.evaluations);
}

#[test]
fn test_shared_metrics_injection() {
    let metrics = Arc::new(authgov::EvalMetrics::new());
    let store_a = PolicyStore::with_metrics(Arc::clone(&metrics));
    let store_b = PolicyStore::with_metrics(Arc::clone(&metrics));

    store_a.authorize("alice", "read", "/x", None);
    store_b.authorize("bob", "read", "/y", None);

    assert_eq!(metrics.snapshot().evaluations, 2);
}

mod determinism {
    use super::*;
    use proptest::prelude::*;

    fn arb_policy() -> impl Strategy<Value = Policy> {
        (
            "[a-z]{1,8}",
            prop::collection::vec(prop_oneof![Just("*".to_string()), "[a-z]{1,6}"], 0..3),
            prop::collection::vec(prop_oneof![Just("*".to_string()), "[a-z]{1,6}"], 0..3),
            prop::collection::vec("/[a-z]{1,6}", 0..3),
            prop::bool::ANY,
            prop::collection::vec("1[0-9]\\.", 0..2),
        )
            .prop_map(|(id, subjects, actions, resources, allow, ips)| {
                let mut p = Policy::new(
                    id,
                    if allow { Effect::Allow } else { Effect::Deny },
                );
                p.subjects = subjects.into_iter().collect();
                p.actions = actions.into_iter().collect();
                p.resources = resources;
                p.allowed_ip_prefixes = ips;
                p
            })
    }

    proptest! {
        /// Identical inputs against an unchanged list always yield an
        /// identical decision, and counters account for every evaluation.
        #[test]
        fn identical_inputs_identical_decisions(
            policies in prop::collection::vec(arb_policy(), 0..8),
            identity in "[a-z]{1,6}",
            action in "[a-z]{1,6}",
            resource in "/[a-z]{1,6}",
        ) {
            let store = PolicyStore::new();
            store.set_policies(policies);
            let first = store.authorize(&identity, &action, &resource, None);
            let second = store.authorize(&identity, &action, &resource, None);
            prop_assert_eq!(first, second);

            let snap = store.metrics().snapshot();
            prop_assert_eq!(snap.evaluations, 2);
            prop_assert_eq!(snap.allows + snap.denies, 2);
        }
    }
}
