//! Property tests for dependency resolution.
use proptest::prelude::*;
use std::collections::BTreeMap;
use waypost::metadata::{
    DependencyNode, DependentEntry, DependentPicklistField, MetadataSnapshot, PathStepConfig,
    PicklistEntry, ValidFor,
};
use waypost::resolver::DependencyResolver;
use waypost::validity::encode_bitmap;

/// Controlling values `V0..Vn`.
fn arb_entries() -> impl Strategy<Value = Vec<PicklistEntry>> {
    (0usize..6).prop_map(|n| {
        (0..n)
            .map(|i| PicklistEntry::new(format!("V{}", i), format!("Value {}", i)))
            .collect::<Vec<_>>()
    })
}

/// Nested dependents, at most two levels below a direct dependent.
fn arb_nested() -> impl Strategy<Value = DependencyNode> {
    prop_oneof![
        Just(DependencyNode::Leaf),
        prop::collection::btree_map("[A-C]", Just(DependencyNode::Leaf), 1..3)
            .prop_map(DependencyNode::from),
        prop::collection::btree_map(
            "[A-C]",
            prop::collection::btree_map("[X-Z]", Just(DependencyNode::Leaf), 0..2)
                .prop_map(DependencyNode::from),
            1..3,
        )
        .prop_map(DependencyNode::from),
    ]
}

/// Valid-for ordinals, including some past the end of any picklist.
fn arb_ordinals() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..8, 0..4)
}

/// Direct dependents `D0..Dn` with their nested trees and picklist data.
fn arb_dependents() -> impl Strategy<Value = Vec<(DependencyNode, Vec<Vec<usize>>)>> {
    prop::collection::vec(
        (arb_nested(), prop::collection::vec(arb_ordinals(), 0..3)),
        0..4,
    )
}

/// Step configs, some for values outside the picklist.
fn arb_steps() -> impl Strategy<Value = Vec<PathStepConfig>> {
    prop::collection::vec(
        (0usize..8, prop::collection::vec("C[0-3]", 0..3)),
        0..5,
    )
    .prop_map(|steps| {
        steps
            .into_iter()
            .map(|(i, fields)| PathStepConfig::new(format!("V{}", i)).with_dependent_fields(fields))
            .collect::<Vec<_>>()
    })
}

fn build_snapshot(
    entries: Vec<PicklistEntry>,
    dependents: Vec<(DependencyNode, Vec<Vec<usize>>)>,
    steps: Vec<PathStepConfig>,
    bitmask: bool,
) -> MetadataSnapshot {
    let mut tree = BTreeMap::new();
    let mut dependent_fields = BTreeMap::new();
    for (j, (nested, valid_for)) in dependents.into_iter().enumerate() {
        let field = format!("D{}", j);
        let values = valid_for
            .into_iter()
            .enumerate()
            .map(|(k, ordinals)| DependentEntry {
                value: format!("{}_{}", field, k),
                label: String::new(),
                valid_for: if bitmask {
                    ValidFor::Bitmask(encode_bitmap(ordinals))
                } else {
                    ValidFor::Ordinals(ordinals)
                },
            })
            .collect();
        tree.insert(field.clone(), nested);
        dependent_fields.insert(
            field.clone(),
            DependentPicklistField {
                field,
                entries: values,
            },
        );
    }

    MetadataSnapshot {
        controlling_field: "Stage".to_string(),
        record_type_id: None,
        entries,
        dependencies: DependencyNode::from(tree),
        dependent_fields,
        steps,
    }
}

fn arb_snapshot() -> impl Strategy<Value = MetadataSnapshot> {
    (arb_entries(), arb_dependents(), arb_steps())
        .prop_map(|(entries, dependents, steps)| build_snapshot(entries, dependents, steps, false))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn resolution_is_idempotent(snapshot in arb_snapshot()) {
        let resolver = DependencyResolver::new(snapshot);
        prop_assert_eq!(resolver.resolve(), resolver.resolve());
    }

    #[test]
    fn merge_order_does_not_matter(snapshot in arb_snapshot()) {
        let resolver = DependencyResolver::new(snapshot);
        let (native, _) = resolver.resolve_native();
        let custom = resolver.resolve_custom();

        prop_assert_eq!(
            native.clone().merged(custom.clone()),
            custom.merged(native)
        );
    }

    #[test]
    fn custom_fields_are_complete(snapshot in arb_snapshot()) {
        let resolver = DependencyResolver::new(snapshot.clone());
        let resolved = resolver.resolve().dependencies;

        for step in snapshot.steps.iter().filter(|s| resolver.index().contains(&s.value)) {
            for field in &step.dependent_fields {
                prop_assert!(
                    resolved.fields_for(&step.value).is_some_and(|f| f.contains(field)),
                    "{} missing under {}", field, step.value
                );
            }
        }
    }

    #[test]
    fn every_key_is_a_picklist_value(snapshot in arb_snapshot()) {
        let resolver = DependencyResolver::new(snapshot);
        let resolved = resolver.resolve().dependencies;

        for value in resolved.values() {
            prop_assert!(resolver.index().contains(value), "stale key {}", value);
        }
        for (_, fields) in resolved.iter() {
            prop_assert!(!fields.is_empty());
        }
    }

    #[test]
    fn no_dependents_resolve_to_nothing(entries in arb_entries()) {
        let snapshot = build_snapshot(entries, vec![], vec![], false);
        prop_assert!(DependencyResolver::new(snapshot).resolve().dependencies.is_empty());
    }

    #[test]
    fn bitmask_and_ordinals_agree(
        entries in arb_entries(),
        dependents in arb_dependents(),
        steps in arb_steps(),
    ) {
        let ordinals = build_snapshot(entries.clone(), dependents.clone(), steps.clone(), false);
        let bitmask = build_snapshot(entries, dependents, steps, true);

        prop_assert_eq!(
            DependencyResolver::new(ordinals).resolve(),
            DependencyResolver::new(bitmask).resolve()
        );
    }
}
