//! Host-facing session for one path widget instance.
//!
//! The widget accepts metadata snapshots in whatever order the host delivers
//! them, re-resolves dependencies whenever a consistent set is available, and
//! drives the [`StepTransitionEngine`] against the host's async services.

use crate::config::WidgetConfig;
use crate::error::{MetadataError, ResolveError, TransitionError, label_errors_with_numbers};
use crate::host::{
    FieldCollectionOutcome, FieldCollectionRequest, HostError, Notification, PathHost,
    RecordUpdate, Severity,
};
use crate::metadata::ui_api::{
    ObjectInfoPayload, PicklistValuesByRecordTypePayload, PicklistValuesPayload, RecordPayload,
};
use crate::metadata::{DependencyNode, MetadataSnapshot, PathStepConfig, PicklistEntry};
use crate::resolver::DependencyResolver;
use crate::transition::{
    Coaching, FlowOutcome, FlowRequest, GatingDecision, StepTransitionEngine, StepView,
};
use crate::validity::{DefaultValidityDecoder, ValidityDecoder};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Data tagged with the record type it was fetched for.
#[derive(Debug, Clone)]
struct Scoped<T> {
    record_type_id: String,
    data: T,
}

/// Last-known metadata, one slot per independent source.
#[derive(Debug, Default)]
struct MetadataInputs {
    record_type_id: Option<String>,
    field_label: Option<String>,
    dependencies: Option<DependencyNode>,
    controlling: Option<Scoped<Vec<PicklistEntry>>>,
    picklists: Option<Scoped<PicklistValuesByRecordTypePayload>>,
    steps: Option<Vec<PathStepConfig>>,
}

/// Marks a commit as in flight and holds the engine for its duration.
///
/// Dropping the guard clears the mark and abandons any transition that was
/// left pending, whether the commit returned or its future was dropped.
struct InFlight<'a> {
    saving: &'a Cell<bool>,
    engine: &'a mut StepTransitionEngine,
}

impl<'a> InFlight<'a> {
    fn enter(
        saving: &'a Cell<bool>,
        engine: &'a mut StepTransitionEngine,
    ) -> Result<Self, TransitionError> {
        if saving.get() {
            return Err(TransitionError::CommitInFlight);
        }
        if let Some(target) = engine.state().target() {
            return Err(TransitionError::PathDisabled(target.to_string()));
        }
        saving.set(true);
        Ok(Self { saving, engine })
    }
}

impl Deref for InFlight<'_> {
    type Target = StepTransitionEngine;

    fn deref(&self) -> &Self::Target {
        self.engine
    }
}

impl DerefMut for InFlight<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.engine
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.engine.is_busy() {
            self.engine.cancel_pending();
        }
        self.saving.set(false);
    }
}

pub struct PathWidget<H: PathHost> {
    host: H,
    engine: StepTransitionEngine,
    decoder: Arc<dyn ValidityDecoder>,
    inputs: MetadataInputs,
    skipped: Vec<ResolveError>,
    saving: Cell<bool>,
}

pub struct PathWidgetBuilder<H: PathHost> {
    config: WidgetConfig,
    host: H,
    decoder: Arc<dyn ValidityDecoder>,
}

impl<H: PathHost> PathWidgetBuilder<H> {
    pub fn with_decoder(mut self, decoder: impl ValidityDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    pub fn build(self) -> PathWidget<H> {
        PathWidget {
            host: self.host,
            engine: StepTransitionEngine::new(self.config),
            decoder: self.decoder,
            inputs: MetadataInputs::default(),
            skipped: Vec::new(),
            saving: Cell::new(false),
        }
    }
}

impl<H: PathHost> PathWidget<H> {
    pub fn builder(config: WidgetConfig, host: H) -> PathWidgetBuilder<H> {
        PathWidgetBuilder {
            config,
            host,
            decoder: Arc::new(DefaultValidityDecoder),
        }
    }

    pub fn new(config: WidgetConfig, host: H) -> Self {
        Self::builder(config, host).build()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn engine(&self) -> &StepTransitionEngine {
        &self.engine
    }

    pub fn config(&self) -> &WidgetConfig {
        self.engine.config()
    }

    /// Dependent fields left out of the last resolution as malformed.
    pub fn skipped_fields(&self) -> &[ResolveError] {
        &self.skipped
    }

    pub fn is_saving(&self) -> bool {
        self.saving.get()
    }

    /// The path ignores clicks while a commit or a gated transition is pending.
    pub fn is_path_disabled(&self) -> bool {
        self.saving.get() || self.engine.is_busy()
    }

    pub fn field_label(&self) -> String {
        let config = self.engine.config();
        self.inputs
            .field_label
            .clone()
            .or_else(|| config.field_label.clone())
            .unwrap_or_else(|| config.field_api_name.clone())
    }

    pub fn button_label(&self) -> String {
        self.engine.completion_action().label(&self.field_label())
    }

    pub fn step_views(&self) -> Vec<StepView> {
        self.engine.step_views()
    }

    pub fn coaching(&self) -> Option<Coaching<'_>> {
        self.engine.coaching()
    }

    // --- Metadata ingestion ---

    /// Record data arrived: the committed value and the record type.
    pub fn on_record(&mut self, record: &RecordPayload) {
        let field = &self.engine.config().field_api_name;
        let value = record.field(field).and_then(|f| f.value.clone());
        tracing::debug!(
            value = ?value,
            record_type = record.record_type_name(),
            "Record data received"
        );

        self.engine.sync_record(value);
        self.inputs.record_type_id = Some(record.record_type_id().to_string());
        self.refresh();
    }

    pub fn on_object_info(&mut self, info: &ObjectInfoPayload) {
        let field = self.engine.config().field_api_name.clone();
        if let Some(label) = info.field_label(&field).filter(|l| !l.is_empty()) {
            self.inputs.field_label = Some(label.to_string());
        }
        self.inputs.dependencies = Some(info.dependency_tree(&field));
        self.refresh();
    }

    /// Controlling field values for `record_type_id`.
    pub fn on_picklist_values(&mut self, record_type_id: &str, values: &PicklistValuesPayload) {
        self.inputs.controlling = Some(Scoped {
            record_type_id: record_type_id.to_string(),
            data: values.entries(),
        });
        self.refresh();
    }

    /// Values of every picklist on the object for `record_type_id`.
    pub fn on_picklist_values_by_record_type(
        &mut self,
        record_type_id: &str,
        payload: PicklistValuesByRecordTypePayload,
    ) {
        self.inputs.picklists = Some(Scoped {
            record_type_id: record_type_id.to_string(),
            data: payload,
        });
        self.refresh();
    }

    pub fn on_path_steps(&mut self, steps: Vec<PathStepConfig>) {
        self.inputs.steps = Some(steps);
        self.refresh();
    }

    /// A metadata fetch failed. Logged only; the last-known state is kept and
    /// the host re-delivers once the source recovers.
    pub fn on_metadata_error(&self, error: &MetadataError) {
        tracing::error!(error = %error, "Metadata fetch failed; keeping last known state");
    }

    /// Snapshot of the inputs if every source has delivered data for the
    /// current record type.
    pub fn snapshot(&self) -> Option<MetadataSnapshot> {
        let inputs = &self.inputs;
        let record_type_id = inputs.record_type_id.as_ref()?;
        let controlling = inputs
            .controlling
            .as_ref()
            .filter(|c| &c.record_type_id == record_type_id)?;
        let picklists = inputs
            .picklists
            .as_ref()
            .filter(|p| &p.record_type_id == record_type_id)?;
        let dependencies = inputs.dependencies.as_ref()?;
        let steps = inputs.steps.as_ref()?;

        Some(MetadataSnapshot {
            controlling_field: self.engine.config().field_api_name.clone(),
            record_type_id: Some(record_type_id.clone()),
            entries: controlling.data.clone(),
            dependencies: dependencies.clone(),
            dependent_fields: picklists.data.dependent_fields_for(dependencies),
            steps: steps.clone(),
        })
    }

    /// Re-resolves from the current inputs. Returns `false` while some source
    /// is still missing or scoped to a stale record type.
    pub fn refresh(&mut self) -> bool {
        let Some(snapshot) = self.snapshot() else {
            tracing::debug!("Waiting for metadata for the current record type");
            return false;
        };

        let resolver = DependencyResolver::builder(snapshot)
            .with_shared_decoder(Arc::clone(&self.decoder))
            .with_max_depth(self.engine.config().max_dependency_depth)
            .build();
        let resolution = resolver.resolve();
        let index = resolver.index().clone();
        let steps = resolver.snapshot().steps.clone();

        self.engine.load(index, steps, resolution.dependencies);
        self.skipped = resolution.skipped;
        true
    }

    // --- User actions ---

    pub fn select(&mut self, value: &str) -> Result<(), TransitionError> {
        if self.saving.get() {
            return Err(TransitionError::CommitInFlight);
        }
        self.engine.select(value)
    }

    /// "Mark as complete" / "Mark as current": gates the transition and
    /// carries out whatever the gate requires.
    pub async fn mark_complete(&mut self) -> Result<(), TransitionError> {
        let field_label = self.field_label();
        let record_type_id = self.inputs.record_type_id.clone();
        let host = &self.host;
        let mut engine = InFlight::enter(&self.saving, &mut self.engine)?;

        let decision = match engine.mark_complete() {
            Ok(decision) => decision,
            Err(e) => {
                if let TransitionError::InvalidFlowConfiguration { .. } = &e {
                    tracing::error!(error = %e, "Flow configuration invalid");
                    let title = "Flow configuration invalid!";
                    host.notify(Notification::new(title, e.to_string(), Severity::Error).sticky());
                }
                return Err(e);
            }
        };

        let target_label = engine
            .index()
            .label_of(decision.target())
            .unwrap_or(decision.target())
            .to_string();

        match decision {
            GatingDecision::CommitDirectly { target } => {
                commit_value(host, &mut engine, &target, &field_label, &target_label).await
            }
            GatingDecision::RunFlow { flow, .. } => {
                announce_extra_steps(host, &field_label, &target_label);
                run_flow(host, &mut engine, &flow, &field_label, &target_label).await
            }
            GatingDecision::CollectDependentFields { target, fields } => {
                announce_extra_steps(host, &field_label, &target_label);
                let config = engine.config();
                let request = FieldCollectionRequest {
                    record_id: config.record_id.clone(),
                    record_type_id,
                    object_api_name: config.object_api_name.clone(),
                    field_api_name: config.field_api_name.clone(),
                    fields,
                    target_value: target,
                    target_label: target_label.clone(),
                    description: extra_steps_message(&field_label, &target_label),
                    size: config.modal_size,
                };
                collect_fields(host, &mut engine, &request, &field_label, &target_label).await
            }
        }
    }

    /// Saves fields edited in the key-fields form of the coaching panel.
    ///
    /// The user's selection survives the record refresh this save triggers.
    pub async fn submit_key_fields(
        &mut self,
        fields: BTreeMap<String, serde_json::Value>,
    ) -> Result<(), TransitionError> {
        let host = &self.host;
        let mut engine = InFlight::enter(&self.saving, &mut self.engine)?;

        let update = RecordUpdate {
            record_id: engine.config().record_id.clone(),
            fields,
        };
        tracing::info!(fields = ?update.fields.keys().collect::<Vec<_>>(), "Submitting key fields");
        engine.keep_selection_on_next_sync();

        match host.update_record(&update).await {
            Ok(()) => {
                host.notify(Notification::new(
                    "Success",
                    "Record updated successfully!",
                    Severity::Success,
                ));
                Ok(())
            }
            Err(err) => Err(report_failure(host, "Error updating record!", &err)),
        }
    }

    /// Abandons a pending transition whose modal the host closed without an outcome.
    pub fn cancel_pending(&mut self) {
        self.engine.cancel_pending();
    }
}

fn extra_steps_message(field_label: &str, target_label: &str) -> String {
    format!(
        "Moving the {} to {} requires additional steps!",
        field_label, target_label
    )
}

fn announce_extra_steps<H: PathHost>(host: &H, field_label: &str, target_label: &str) {
    host.notify(Notification::new(
        "Action Required",
        extra_steps_message(field_label, target_label),
        Severity::Info,
    ));
}

/// Logs a host failure, shows it as a sticky itemized error, and converts it.
fn report_failure<H: PathHost>(host: &H, title: &str, err: &HostError) -> TransitionError {
    let messages = HostError::reduce(std::slice::from_ref(err));
    tracing::error!(title, ?messages, "Host service reported an error");
    host.notify(
        Notification::new(title, label_errors_with_numbers(&messages), Severity::Error).sticky(),
    );
    TransitionError::PersistenceFailure { messages }
}

async fn commit_value<H: PathHost>(
    host: &H,
    engine: &mut StepTransitionEngine,
    target: &str,
    field_label: &str,
    target_label: &str,
) -> Result<(), TransitionError> {
    let config = engine.config();
    let update = RecordUpdate {
        record_id: config.record_id.clone(),
        fields: BTreeMap::from([(
            config.field_api_name.clone(),
            serde_json::Value::String(target.to_string()),
        )]),
    };
    tracing::info!(record = %update.record_id, value = target, "Updating path value");

    match host.update_record(&update).await {
        Ok(()) => {
            engine.persisted()?;
            host.notify(Notification::new(
                "Success",
                format!("{} successfully updated to {}!", field_label, target_label),
                Severity::Success,
            ));
            Ok(())
        }
        Err(err) => {
            engine.persist_failed()?;
            let title = format!("Error updating {} to {}!", field_label, target_label);
            Err(report_failure(host, &title, &err))
        }
    }
}

async fn run_flow<H: PathHost>(
    host: &H,
    engine: &mut StepTransitionEngine,
    flow: &FlowRequest,
    field_label: &str,
    target_label: &str,
) -> Result<(), TransitionError> {
    tracing::info!(flow = %flow.flow_api_name, "Opening flow");
    let outcome = host.run_flow(flow, engine.config().modal_size).await;
    tracing::info!(?outcome, "Flow closed");
    engine.flow_finished(&outcome)?;

    match outcome {
        FlowOutcome::Finished => {
            engine.persisted()?;
            host.notify(Notification::new(
                "Success",
                format!("{} successfully updated to {}!", field_label, target_label),
                Severity::Success,
            ));
            Ok(())
        }
        FlowOutcome::Error(err) => {
            let title = format!("Error updating {} to {}!", field_label, target_label);
            Err(report_failure(host, &title, &err))
        }
        FlowOutcome::Override => {
            host.notify(Notification::new(
                "Submitted",
                format!(
                    "The information you provided has been submitted and the {} will be updated to {} after approval!",
                    field_label, target_label
                ),
                Severity::Info,
            ));
            Ok(())
        }
        FlowOutcome::Cancelled => {
            notify_cancelled(host, field_label, target_label);
            Ok(())
        }
    }
}

async fn collect_fields<H: PathHost>(
    host: &H,
    engine: &mut StepTransitionEngine,
    request: &FieldCollectionRequest,
    field_label: &str,
    target_label: &str,
) -> Result<(), TransitionError> {
    tracing::info!(fields = ?request.fields, "Opening dependent field form");

    match host.collect_fields(request).await {
        FieldCollectionOutcome::Submitted => {
            engine.fields_submitted()?;
            host.notify(Notification::new(
                "Success",
                "Record updated successfully!",
                Severity::Success,
            ));
            Ok(())
        }
        FieldCollectionOutcome::Cancelled => {
            engine.fields_cancelled()?;
            notify_cancelled(host, field_label, target_label);
            Ok(())
        }
        FieldCollectionOutcome::Failed(err) => {
            engine.fields_cancelled()?;
            let title = format!("Error updating {} to {}!", field_label, target_label);
            Err(report_failure(host, &title, &err))
        }
    }
}

fn notify_cancelled<H: PathHost>(host: &H, field_label: &str, target_label: &str) {
    host.notify(Notification::new(
        "Cancelled",
        format!("{} update to {} was cancelled.", field_label, target_label),
        Severity::Warning,
    ));
}
