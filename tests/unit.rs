//! Unit tests for the building blocks of dependency resolution.
mod common;
use waypost::error::label_errors_with_numbers;
use waypost::graph::{self, DEFAULT_MAX_DEPTH};
use waypost::host::ErrorBody;
use waypost::prelude::*;
use waypost::validity::{decode_bitmap, encode_bitmap, valid_ordinals};

/// A chain `F1 -> F2 -> ... -> Fn` of nested dependents.
fn chain(len: usize) -> DependencyNode {
    (1..=len).rev().fold(DependencyNode::Leaf, |inner, i| {
        DependencyNode::branch([(format!("F{}", i), inner)])
    })
}

#[test]
fn test_picklist_index_ordinals() {
    let index = PicklistIndex::new(common::stage_entries());

    assert_eq!(index.len(), 3);
    assert_eq!(index.index_of("Qualified"), Some(1));
    assert_eq!(index.value_at(2), Some("Closed"));
    assert_eq!(index.value_at(3), None);
    assert_eq!(index.label_of("Closed"), Some("Closed Won"));
    assert_eq!(index.next_after("New").map(|e| e.value.as_str()), Some("Qualified"));
    assert!(index.next_after("Closed").is_none());
    assert!(index.is_last("Closed"));
    assert!(!index.is_last("Missing"));
}

#[test]
fn test_picklist_index_duplicate_keeps_first_ordinal() {
    let index: PicklistIndex = vec![
        PicklistEntry::new("A", "A"),
        PicklistEntry::new("B", "B"),
        PicklistEntry::new("A", "A again"),
    ]
    .into_iter()
    .collect();

    assert_eq!(index.index_of("A"), Some(0));
    assert_eq!(index.label_of("A"), Some("A"));
    assert_eq!(index.len(), 3);
}

#[test]
fn test_decoder_passes_ordinals_through() {
    let entry = DependentEntry::valid_for("Price", vec![0, 2]);
    let decoded = DefaultValidityDecoder.decode(&entry);

    assert_eq!(decoded.len(), 2);
    assert!(decoded.contains(&0) && decoded.contains(&2));
}

#[test]
fn test_decoder_reads_base64_bitmask() {
    // 0b0010_0000: bit 2 set, most significant bit first.
    let entry = DependentEntry {
        value: "Price".to_string(),
        label: "Price".to_string(),
        valid_for: ValidFor::Bitmask("IA==".to_string()),
    };
    let decoded = DefaultValidityDecoder.decode(&entry);

    assert_eq!(decoded.into_iter().collect::<Vec<_>>(), vec![2]);
}

#[test]
fn test_bitmap_spans_bytes() {
    let decoded = decode_bitmap(&[0b1000_0000, 0b0000_0001]);
    let mut ordinals: Vec<_> = decoded.into_iter().collect();
    ordinals.sort();
    assert_eq!(ordinals, vec![0, 15]);

    assert_eq!(encode_bitmap([2]), "IA==");
}

#[test]
fn test_garbage_bitmask_decodes_to_nothing() {
    let entry = DependentEntry {
        value: "X".to_string(),
        label: "X".to_string(),
        valid_for: ValidFor::Bitmask("not base64!!".to_string()),
    };
    assert!(DefaultValidityDecoder.decode(&entry).is_empty());
}

#[test]
fn test_valid_ordinals_is_union_over_entries() {
    let field = DependentPicklistField {
        field: "Reason".to_string(),
        entries: vec![
            DependentEntry::valid_for("Price", vec![0]),
            DependentEntry::valid_for("Timing", vec![2]),
            DependentEntry::valid_for("Other", vec![]),
        ],
    };
    let ordinals = valid_ordinals(&DefaultValidityDecoder, &field);

    assert_eq!(ordinals.len(), 2);
    assert!(ordinals.contains(&0) && ordinals.contains(&2));
}

#[test]
fn test_flatten_is_preorder() {
    let tree = DependencyNode::branch([
        (
            "A",
            DependencyNode::branch([("A1", DependencyNode::Leaf)]),
        ),
        ("B", DependencyNode::Leaf),
    ]);

    let fields = graph::flatten("Root", &tree, DEFAULT_MAX_DEPTH).unwrap();
    assert_eq!(fields, vec!["A", "A1", "B"]);
}

#[test]
fn test_flatten_leaf_is_empty() {
    let fields = graph::flatten("Root", &DependencyNode::Leaf, DEFAULT_MAX_DEPTH).unwrap();
    assert!(fields.is_empty());
}

#[test]
fn test_flatten_depth_bound() {
    assert_eq!(graph::flatten("Root", &chain(3), 3).unwrap().len(), 3);

    let err = graph::flatten("Root", &chain(4), 3).unwrap_err();
    assert_eq!(
        err,
        ResolveError::MalformedDependencyGraph {
            field: "Root".to_string(),
            max_depth: 3,
        }
    );
    assert!(err.to_string().contains("maximum nesting depth of 3"));
}

#[test]
fn test_dependency_node_from_json() {
    let json = serde_json::json!({
        "Reason": { "SubReason": {} },
        "Notes": ["ignored"],
        "Owner": null,
    });
    let tree = DependencyNode::from_json(&json);

    let children: Vec<_> = tree.children().map(|(name, _)| name).collect();
    assert_eq!(children, vec!["Notes", "Owner", "Reason"]);
    assert!(tree.child("Notes").unwrap().is_empty());
    assert_eq!(
        tree.child("Reason").and_then(|r| r.child("SubReason")),
        Some(&DependencyNode::Leaf)
    );
    assert!(DependencyNode::from_json(&serde_json::json!({})).is_empty());
}

#[test]
fn test_resolved_map_merge_and_sorting() {
    let mut map: ResolvedDependencyMap = [("Closed", vec!["Reason"])].into_iter().collect();
    map.merge([("Closed", vec!["Amount"]), ("New", vec!["Owner"])].into_iter().collect());
    map.insert_all("Qualified", Vec::<String>::new());

    assert_eq!(map.len(), 2);
    assert!(!map.contains_value("Qualified"));
    assert_eq!(map.sorted_fields_for("Closed"), vec!["Amount", "Reason"]);
    assert!(map.requires_fields("New"));
    assert_eq!(
        serde_json::to_value(&map).unwrap(),
        serde_json::json!({ "Closed": ["Amount", "Reason"], "New": ["Owner"] })
    );
}

#[test]
fn test_label_errors_with_numbers() {
    assert_eq!(label_errors_with_numbers(&[]), "Unknown error");
    assert_eq!(label_errors_with_numbers(&["Only".to_string()]), "Only");
    assert_eq!(
        label_errors_with_numbers(&["First".to_string(), "Second".to_string()]),
        "Error 1: First Error 2: Second"
    );
}

#[test]
fn test_host_error_reduction() {
    let errors = vec![
        HostError::page_errors(["Validation failed"]),
        HostError::field_errors([("Amount", vec!["Must be positive", ""])]),
        HostError {
            body: Some(ErrorBody::List(vec![waypost::host::HostMessage::new("Read failed")])),
            ..Default::default()
        },
        HostError {
            status_text: Some("Bad Request".to_string()),
            ..Default::default()
        },
        HostError::default(),
    ];

    assert_eq!(
        HostError::reduce(&errors),
        vec![
            "Validation failed",
            "Must be positive",
            "Read failed",
            "Bad Request"
        ]
    );
}

#[test]
fn test_host_error_prefers_body_over_message() {
    let json = serde_json::json!({
        "body": { "output": { "errors": [{ "message": "Duplicate value" }] }, "message": "ignored" },
        "message": "Also ignored",
    });
    let error: HostError = serde_json::from_value(json).unwrap();

    assert_eq!(error.messages(), vec!["Duplicate value"]);
}

#[test]
fn test_transition_error_messages() {
    let err = TransitionError::InvalidFlowConfiguration {
        value: "Closed".to_string(),
        field: "Stage".to_string(),
        object: "Opportunity".to_string(),
    };
    let text = err.to_string();
    assert!(
        text.contains("the Closed value on the Stage picklist field on the Opportunity object")
    );

    let err = TransitionError::PersistenceFailure {
        messages: vec!["A".to_string(), "B".to_string()],
    };
    assert_eq!(err.to_string(), "Error 1: A Error 2: B");
}

#[test]
fn test_completion_action_labels() {
    assert_eq!(
        CompletionAction::MarkComplete.label("Stage"),
        "Mark Stage as Complete"
    );
    assert_eq!(
        CompletionAction::MarkCurrent.label("Stage"),
        "Mark as Current Stage"
    );
    assert_eq!(CompletionAction::MarkComplete.icon(), Some("utility:check"));
    assert_eq!(CompletionAction::MarkCurrent.icon(), None);
}

#[test]
fn test_config_defaults() {
    let json = r#"{ "recordId": "006", "objectApiName": "Opportunity", "fieldApiName": "Stage" }"#;
    let config: WidgetConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config, WidgetConfig::new("006", "Opportunity", "Stage"));
    assert_eq!(config.max_dependency_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(config.modal_size, ModalSize::Large);
    assert_eq!(config.qualified_field_name(), "Opportunity.Stage");
}
