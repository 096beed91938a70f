use crate::host::HostError;
use serde::Serialize;
use std::fmt;

/// Where a path is in its transition lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransitionState {
    /// No change pending; the path accepts selections.
    #[default]
    Idle,
    /// Waiting for the host to collect `fields` before `target` can be committed.
    PendingDependentFields { target: String, fields: Vec<String> },
    /// Waiting for the host to run `flow_api_name` on the way to `target`.
    PendingFlow {
        target: String,
        flow_api_name: String,
    },
    /// The controlling field is being committed to `target`.
    Saving { target: String },
}

impl TransitionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, TransitionState::Idle)
    }

    /// Value a pending transition is heading to.
    pub fn target(&self) -> Option<&str> {
        match self {
            TransitionState::Idle => None,
            TransitionState::PendingDependentFields { target, .. }
            | TransitionState::PendingFlow { target, .. }
            | TransitionState::Saving { target } => Some(target),
        }
    }
}

impl fmt::Display for TransitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionState::Idle => write!(f, "idle"),
            TransitionState::PendingDependentFields { target, .. } => {
                write!(f, "collecting dependent fields for '{}'", target)
            }
            TransitionState::PendingFlow { target, .. } => {
                write!(f, "running a flow for '{}'", target)
            }
            TransitionState::Saving { target } => write!(f, "saving '{}'", target),
        }
    }
}

/// The named input variables handed to a sub-flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowInputs {
    pub record_id: String,
    pub object_api_name: String,
    pub field_api_name: String,
    pub old_value: String,
    pub new_value: String,
}

/// A single flow input variable. Every input is string-typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowVariable {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub value: String,
}

impl FlowInputs {
    pub fn variables(&self) -> Vec<FlowVariable> {
        [
            ("recordId", &self.record_id),
            ("objectApiName", &self.object_api_name),
            ("fieldApiName", &self.field_api_name),
            ("oldValue", &self.old_value),
            ("newValue", &self.new_value),
        ]
        .into_iter()
        .map(|(name, value)| FlowVariable {
            name,
            type_name: "String",
            value: value.clone(),
        })
        .collect()
    }
}

/// Everything a host needs to launch a sub-flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowRequest {
    pub flow_api_name: String,
    pub inputs: FlowInputs,
}

/// The gating action a requested transition needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatingDecision {
    /// Nothing gates the transition; commit `target` right away.
    CommitDirectly { target: String },
    /// Collect `fields` through a record edit form first.
    CollectDependentFields { target: String, fields: Vec<String> },
    /// Run the configured sub-flow first.
    RunFlow { target: String, flow: FlowRequest },
}

impl GatingDecision {
    pub fn target(&self) -> &str {
        match self {
            GatingDecision::CommitDirectly { target }
            | GatingDecision::CollectDependentFields { target, .. }
            | GatingDecision::RunFlow { target, .. } => target,
        }
    }
}

/// How a sub-flow ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// The flow completed and committed the new value itself.
    Finished,
    /// The flow failed.
    Error(HostError),
    /// The change was submitted for approval instead of applied.
    Override,
    /// The user dismissed the flow.
    Cancelled,
}

/// Which completion action the path offers for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionAction {
    /// The selection is the current value; completing advances to the next one.
    MarkComplete,
    /// The selection differs from the current value; completing jumps to it.
    MarkCurrent,
}

impl CompletionAction {
    pub fn label(&self, field_label: &str) -> String {
        match self {
            CompletionAction::MarkComplete => format!("Mark {} as Complete", field_label),
            CompletionAction::MarkCurrent => format!("Mark as Current {}", field_label),
        }
    }

    pub fn icon(&self) -> Option<&'static str> {
        match self {
            CompletionAction::MarkComplete => Some("utility:check"),
            CompletionAction::MarkCurrent => None,
        }
    }
}
