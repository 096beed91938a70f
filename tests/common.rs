//! Common test utilities for building metadata snapshots and hosts.
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use waypost::config::ModalSize;
use waypost::metadata::ui_api::{
    FieldInfo, FieldValue, ObjectInfoPayload, PicklistValuePayload,
    PicklistValuesByRecordTypePayload, PicklistValuesPayload, RecordPayload,
};
use waypost::prelude::*;

#[allow(dead_code)]
pub const RECORD_TYPE: &str = "012000000000001AAA";

/// The controlling picklist `Stage`: `[New, Qualified, Closed]`.
#[allow(dead_code)]
pub fn stage_entries() -> Vec<PicklistEntry> {
    vec![
        PicklistEntry::new("New", "New"),
        PicklistEntry::new("Qualified", "Qualified"),
        PicklistEntry::new("Closed", "Closed Won"),
    ]
}

/// A `Stage` snapshot without dependents or step configs.
#[allow(dead_code)]
pub fn stage_snapshot() -> MetadataSnapshot {
    MetadataSnapshot {
        controlling_field: "Stage".to_string(),
        record_type_id: Some(RECORD_TYPE.to_string()),
        entries: stage_entries(),
        ..Default::default()
    }
}

/// `Reason` with every entry valid only for `Closed` (ordinal 2).
#[allow(dead_code)]
pub fn reason_field() -> DependentPicklistField {
    DependentPicklistField {
        field: "Reason".to_string(),
        entries: vec![
            DependentEntry::valid_for("Price", vec![2]),
            DependentEntry::valid_for("Timing", vec![2]),
        ],
    }
}

/// Snapshot where `Reason` depends natively on `Stage`, with `nested` below it.
#[allow(dead_code)]
pub fn native_snapshot(nested: DependencyNode) -> MetadataSnapshot {
    let mut snapshot = stage_snapshot();
    snapshot.dependencies = DependencyNode::branch([("Reason", nested)]);
    snapshot
        .dependent_fields
        .insert("Reason".to_string(), reason_field());
    snapshot
}

/// Engine loaded with the `Stage` entries, the given steps and dependencies.
#[allow(dead_code)]
pub fn engine_with(
    steps: Vec<PathStepConfig>,
    dependencies: ResolvedDependencyMap,
    current: &str,
) -> StepTransitionEngine {
    let mut engine = StepTransitionEngine::new(widget_config());
    engine.load(PicklistIndex::new(stage_entries()), steps, dependencies);
    engine.sync_record(Some(current.to_string()));
    engine
}

#[allow(dead_code)]
pub fn widget_config() -> WidgetConfig {
    WidgetConfig::new("006000000000001", "Opportunity", "Stage")
}

// --- UI API payloads ---

#[allow(dead_code)]
pub fn record_payload(stage: &str) -> RecordPayload {
    let mut record = RecordPayload {
        record_type_id: Some(RECORD_TYPE.to_string()),
        ..Default::default()
    };
    record.fields.insert(
        "Stage".to_string(),
        FieldValue {
            value: Some(stage.to_string()),
            display_value: None,
        },
    );
    record
}

#[allow(dead_code)]
pub fn object_info_payload() -> ObjectInfoPayload {
    let mut info = ObjectInfoPayload::default();
    info.fields.insert(
        "Stage".to_string(),
        FieldInfo {
            label: "Stage".to_string(),
        },
    );
    info.dependent_fields.insert(
        "Stage".to_string(),
        serde_json::json!({ "Reason": { "SubReason": {} } }),
    );
    info
}

#[allow(dead_code)]
pub fn stage_values_payload() -> PicklistValuesPayload {
    PicklistValuesPayload {
        values: stage_entries()
            .into_iter()
            .map(|e| PicklistValuePayload {
                value: e.value,
                label: e.label,
                valid_for: vec![],
            })
            .collect(),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn picklists_payload() -> PicklistValuesByRecordTypePayload {
    let mut payload = PicklistValuesByRecordTypePayload::default();
    payload
        .picklist_field_values
        .insert("Stage".to_string(), stage_values_payload());
    payload.picklist_field_values.insert(
        "Reason".to_string(),
        PicklistValuesPayload {
            values: vec![PicklistValuePayload {
                value: "Price".to_string(),
                label: "Price".to_string(),
                valid_for: vec![2],
            }],
            ..Default::default()
        },
    );
    payload
}

// --- Mock host ---

/// Records every host call and answers from queued responses.
///
/// With `stalled` set, every async call is recorded and then never resolves.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockHost {
    pub stalled: Cell<bool>,
    pub updates: RefCell<Vec<RecordUpdate>>,
    pub flows: RefCell<Vec<(FlowRequest, ModalSize)>>,
    pub collections: RefCell<Vec<FieldCollectionRequest>>,
    pub notifications: RefCell<Vec<Notification>>,
    pub update_results: RefCell<VecDeque<std::result::Result<(), HostError>>>,
    pub flow_outcomes: RefCell<VecDeque<FlowOutcome>>,
    pub collection_outcomes: RefCell<VecDeque<FieldCollectionOutcome>>,
}

#[allow(dead_code)]
impl MockHost {
    pub fn titles(&self) -> Vec<String> {
        self.notifications
            .borrow()
            .iter()
            .map(|n| n.title.clone())
            .collect()
    }

    pub fn last_notification(&self) -> Option<Notification> {
        self.notifications.borrow().last().cloned()
    }

    async fn stall_if_set(&self) {
        if self.stalled.get() {
            std::future::pending::<()>().await;
        }
    }
}

impl PersistenceService for MockHost {
    async fn update_record(&self, update: &RecordUpdate) -> std::result::Result<(), HostError> {
        self.updates.borrow_mut().push(update.clone());
        self.stall_if_set().await;
        self.update_results.borrow_mut().pop_front().unwrap_or(Ok(()))
    }
}

impl FlowRunner for MockHost {
    async fn run_flow(&self, request: &FlowRequest, size: ModalSize) -> FlowOutcome {
        self.flows.borrow_mut().push((request.clone(), size));
        self.stall_if_set().await;
        self.flow_outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or(FlowOutcome::Finished)
    }
}

impl FieldCollector for MockHost {
    async fn collect_fields(&self, request: &FieldCollectionRequest) -> FieldCollectionOutcome {
        self.collections.borrow_mut().push(request.clone());
        self.stall_if_set().await;
        self.collection_outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or(FieldCollectionOutcome::Submitted)
    }
}

impl NotificationSink for MockHost {
    fn notify(&self, notification: Notification) {
        self.notifications.borrow_mut().push(notification);
    }
}
