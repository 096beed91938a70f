use crate::config::WidgetConfig;
use crate::error::TransitionError;
use crate::metadata::{PathStepConfig, PicklistEntry};
use crate::picklist::PicklistIndex;
use crate::resolver::ResolvedDependencyMap;
use ahash::AHashMap;

mod state;
mod view;

pub use state::*;
pub use view::*;

/// State machine deciding how a path moves from its current value to a new one.
///
/// The engine never performs I/O. Each requested transition yields a
/// [`GatingDecision`]; the caller carries it out and reports back with one of
/// the event methods (`flow_finished`, `fields_submitted`, `persisted`, ...).
#[derive(Debug, Clone)]
pub struct StepTransitionEngine {
    config: WidgetConfig,
    index: PicklistIndex,
    steps: AHashMap<String, PathStepConfig>,
    dependencies: ResolvedDependencyMap,
    current: Option<String>,
    selected: Option<String>,
    /// Selection to restore if the pending transition is abandoned.
    selection_before: Option<String>,
    /// Target whose dependent fields were already collected.
    fields_collected_for: Option<String>,
    keep_selection_on_sync: bool,
    state: TransitionState,
}

impl StepTransitionEngine {
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            config,
            index: PicklistIndex::default(),
            steps: AHashMap::new(),
            dependencies: ResolvedDependencyMap::new(),
            current: None,
            selected: None,
            selection_before: None,
            fields_collected_for: None,
            keep_selection_on_sync: false,
            state: TransitionState::Idle,
        }
    }

    /// Replaces the metadata the engine decides with. Called on every refresh.
    pub fn load(
        &mut self,
        index: PicklistIndex,
        steps: Vec<PathStepConfig>,
        dependencies: ResolvedDependencyMap,
    ) {
        self.index = index;
        self.steps = steps
            .into_iter()
            .map(|step| (step.value.clone(), step))
            .collect();
        self.dependencies = dependencies;
    }

    /// Applies the committed record value.
    ///
    /// The selection follows unless a key-field save asked to keep it.
    pub fn sync_record(&mut self, value: Option<String>) {
        if !self.keep_selection_on_sync {
            self.selected = value.clone();
        }
        if value != self.current {
            self.fields_collected_for = None;
        }
        self.keep_selection_on_sync = false;
        self.current = value;
    }

    /// Keeps the user's selection across the next record refresh.
    pub fn keep_selection_on_next_sync(&mut self) {
        self.keep_selection_on_sync = true;
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn index(&self) -> &PicklistIndex {
        &self.index
    }

    pub fn dependencies(&self) -> &ResolvedDependencyMap {
        &self.dependencies
    }

    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.selected
            .as_deref()
            .and_then(|value| self.index.label_of(value).or(Some(value)))
    }

    /// True while a transition is pending; the path ignores selections then.
    pub fn is_busy(&self) -> bool {
        !self.state.is_idle()
    }

    pub fn step(&self, value: &str) -> Option<&PathStepConfig> {
        self.steps.get(value)
    }

    pub fn selected_step(&self) -> Option<&PathStepConfig> {
        self.selected.as_deref().and_then(|v| self.steps.get(v))
    }

    /// Resolved dependent fields for the selected value, sorted.
    pub fn selected_dependent_fields(&self) -> Vec<String> {
        self.selected
            .as_deref()
            .map(|v| self.dependencies.sorted_fields_for(v))
            .unwrap_or_default()
    }

    /// A click on a step.
    pub fn select(&mut self, value: &str) -> Result<(), TransitionError> {
        if let Some(target) = self.state.target() {
            return Err(TransitionError::PathDisabled(target.to_string()));
        }
        if !self.index.contains(value) {
            return Err(TransitionError::UnknownValue(value.to_string()));
        }
        if self.selected.as_deref() != Some(value) {
            self.fields_collected_for = None;
        }
        self.selected = Some(value.to_string());
        Ok(())
    }

    pub fn completion_action(&self) -> CompletionAction {
        if self.selected == self.current {
            CompletionAction::MarkComplete
        } else {
            CompletionAction::MarkCurrent
        }
    }

    /// The entry completing would move to. `None` when completion is disabled.
    ///
    /// Completing the current value advances to the next entry. A current
    /// value missing from the picklist advances to the first entry.
    pub fn completion_target(&self) -> Option<&PicklistEntry> {
        let selected = self.selected.as_deref()?;
        if self.current.as_deref() != Some(selected) {
            return self.index.index_of(selected).and_then(|i| self.index.entry_at(i));
        }
        if self.index.contains(selected) {
            self.index.next_after(selected)
        } else {
            self.index.entry_at(0)
        }
    }

    /// Completion is disabled when there is nothing to move to, most often
    /// because the current value is the last one.
    pub fn is_completion_disabled(&self) -> bool {
        self.completion_target().is_none()
    }

    /// Requests completion of the selected step and decides how to gate it.
    pub fn mark_complete(&mut self) -> Result<GatingDecision, TransitionError> {
        if let Some(target) = self.state.target() {
            return Err(TransitionError::PathDisabled(target.to_string()));
        }
        let selected = self
            .selected
            .clone()
            .ok_or(TransitionError::NotReady("selected value"))?;

        let target = match self.completion_target() {
            Some(entry) => entry.value.clone(),
            None => return Err(TransitionError::CompletionDisabled(selected)),
        };

        self.selection_before = Some(selected);
        self.selected = Some(target.clone());
        self.decide(target)
    }

    fn decide(&mut self, target: String) -> Result<GatingDecision, TransitionError> {
        if let Some(step) = self.steps.get(&target).filter(|s| s.run_flow) {
            let flow_api_name = step
                .flow_api_name
                .clone()
                .filter(|name| step.flow_valid && !name.is_empty());
            let Some(flow_api_name) = flow_api_name else {
                self.abandon();
                return Err(TransitionError::InvalidFlowConfiguration {
                    value: target,
                    field: self.config.field_api_name.clone(),
                    object: self.config.object_api_name.clone(),
                });
            };

            let flow = FlowRequest {
                flow_api_name: flow_api_name.clone(),
                inputs: self.flow_inputs(&target),
            };
            tracing::info!(value = %target, flow = %flow_api_name, "Transition requires a flow");
            self.state = TransitionState::PendingFlow {
                target: target.clone(),
                flow_api_name,
            };
            return Ok(GatingDecision::RunFlow { target, flow });
        }

        let fields = self.dependencies.sorted_fields_for(&target);
        if !fields.is_empty() && self.fields_collected_for.as_deref() != Some(target.as_str()) {
            tracing::info!(value = %target, ?fields, "Transition requires dependent fields");
            self.state = TransitionState::PendingDependentFields {
                target: target.clone(),
                fields: fields.clone(),
            };
            return Ok(GatingDecision::CollectDependentFields { target, fields });
        }

        tracing::debug!(value = %target, "No flow or dependent fields required");
        self.state = TransitionState::Saving {
            target: target.clone(),
        };
        Ok(GatingDecision::CommitDirectly { target })
    }

    fn flow_inputs(&self, target: &str) -> FlowInputs {
        FlowInputs {
            record_id: self.config.record_id.clone(),
            object_api_name: self.config.object_api_name.clone(),
            field_api_name: self.config.field_api_name.clone(),
            old_value: self.current.clone().unwrap_or_default(),
            new_value: target.to_string(),
        }
    }

    /// Reports how the sub-flow ended.
    ///
    /// A finished flow has committed the value itself, so the engine moves to
    /// `Saving` and waits for [`persisted`](Self::persisted).
    pub fn flow_finished(&mut self, outcome: &FlowOutcome) -> Result<(), TransitionError> {
        let TransitionState::PendingFlow { target, .. } = &self.state else {
            return Err(self.unexpected("flow_finished"));
        };
        match outcome {
            FlowOutcome::Finished => {
                self.state = TransitionState::Saving {
                    target: target.clone(),
                };
            }
            FlowOutcome::Override => {
                self.state = TransitionState::Idle;
                self.selection_before = None;
            }
            FlowOutcome::Error(_) | FlowOutcome::Cancelled => self.abandon(),
        }
        Ok(())
    }

    /// The dependent-field form was saved. `current` is not changed; a later
    /// completion of the same target commits it without collecting again.
    ///
    /// The form save refreshes the record, so the selection is kept across
    /// the next sync.
    pub fn fields_submitted(&mut self) -> Result<(), TransitionError> {
        let TransitionState::PendingDependentFields { target, .. } = &self.state else {
            return Err(self.unexpected("fields_submitted"));
        };
        self.fields_collected_for = Some(target.clone());
        self.keep_selection_on_sync = true;
        self.selection_before = None;
        self.state = TransitionState::Idle;
        Ok(())
    }

    /// The dependent-field form was dismissed or failed to save.
    pub fn fields_cancelled(&mut self) -> Result<(), TransitionError> {
        if !matches!(self.state, TransitionState::PendingDependentFields { .. }) {
            return Err(self.unexpected("fields_cancelled"));
        }
        self.abandon();
        Ok(())
    }

    /// The commit succeeded; the target becomes the current value.
    pub fn persisted(&mut self) -> Result<(), TransitionError> {
        let TransitionState::Saving { target } = &self.state else {
            return Err(self.unexpected("persisted"));
        };
        tracing::info!(value = %target, "Path value committed");
        self.current = Some(target.clone());
        self.selected = Some(target.clone());
        self.selection_before = None;
        self.fields_collected_for = None;
        self.state = TransitionState::Idle;
        Ok(())
    }

    /// The commit was rejected; the current value is unchanged.
    pub fn persist_failed(&mut self) -> Result<(), TransitionError> {
        if !matches!(self.state, TransitionState::Saving { .. }) {
            return Err(self.unexpected("persist_failed"));
        }
        self.selection_before = None;
        self.state = TransitionState::Idle;
        Ok(())
    }

    /// Drops whatever transition is pending and restores the prior selection.
    /// Used when the host tears down a modal without reporting an outcome.
    pub fn cancel_pending(&mut self) {
        if self.is_busy() {
            tracing::warn!(state = %self.state, "Abandoning pending transition");
        }
        self.abandon();
    }

    fn abandon(&mut self) {
        if let Some(previous) = self.selection_before.take() {
            self.selected = Some(previous);
        }
        self.state = TransitionState::Idle;
    }

    fn unexpected(&self, event: &'static str) -> TransitionError {
        TransitionError::UnexpectedEvent {
            event,
            state: self.state.to_string(),
        }
    }

    /// Every step tagged with its render state, in ordinal order.
    pub fn step_views(&self) -> Vec<StepView> {
        let current_idx = self.current.as_deref().and_then(|c| self.index.index_of(c));
        self.index
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let is_current = self.current.as_deref() == Some(entry.value.as_str());
                let is_active = self.selected.as_deref() == Some(entry.value.as_str());
                let is_complete =
                    !is_current && !is_active && current_idx.is_some_and(|c| idx < c);
                StepView {
                    value: entry.value.clone(),
                    label: entry.label.clone(),
                    is_current,
                    is_active,
                    is_complete,
                }
            })
            .collect()
    }

    /// Guidance and key fields for the selected step, if it has any.
    pub fn coaching(&self) -> Option<Coaching<'_>> {
        let step = self.selected_step()?;
        let guidance = step.guidance.as_deref().filter(|g| !g.is_empty());
        if guidance.is_none() && step.key_fields.is_empty() {
            return None;
        }
        Some(Coaching {
            guidance,
            key_fields: &step.key_fields,
        })
    }
}
