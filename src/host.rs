//! Boundary between the path engine and the host platform's services.
//!
//! The engine only decides; a host implements these traits to persist values,
//! run sub-flows, present record edit forms and show notifications.

use crate::config::ModalSize;
use crate::transition::{FlowOutcome, FlowRequest};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A single message inside a host error payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostMessage {
    pub message: String,
}

impl HostMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// DML output block of a host error body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorOutput {
    #[serde(default)]
    pub errors: Vec<HostMessage>,
    #[serde(default, alias = "fieldErrors")]
    pub field_errors: BTreeMap<String, Vec<HostMessage>>,
}

/// Structured body of a host error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, alias = "pageErrors")]
    pub page_errors: Vec<HostMessage>,
    #[serde(default, alias = "fieldErrors")]
    pub field_errors: BTreeMap<String, Vec<HostMessage>>,
    #[serde(default)]
    pub output: Option<ErrorOutput>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    /// Read errors come back as a plain list.
    List(Vec<HostMessage>),
    Detail(ErrorDetail),
}

/// An error reported by a host service, in any of the shapes the host uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostError {
    #[serde(default)]
    pub body: Option<ErrorBody>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "statusText")]
    pub status_text: Option<String>,
}

impl HostError {
    /// A plain error carrying only a message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn page_errors<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            body: Some(ErrorBody::Detail(ErrorDetail {
                page_errors: messages.into_iter().map(HostMessage::new).collect(),
                ..Default::default()
            })),
            ..Default::default()
        }
    }

    pub fn field_errors<I, F, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = (F, Vec<S>)>,
        F: Into<String>,
        S: Into<String>,
    {
        Self {
            body: Some(ErrorBody::Detail(ErrorDetail {
                field_errors: errors
                    .into_iter()
                    .map(|(field, msgs)| {
                        (field.into(), msgs.into_iter().map(HostMessage::new).collect())
                    })
                    .collect(),
                ..Default::default()
            })),
            ..Default::default()
        }
    }

    /// The messages this error carries, most specific shape first.
    pub fn messages(&self) -> Vec<String> {
        let from_body = match &self.body {
            Some(ErrorBody::List(list)) => Some(texts(list)),
            Some(ErrorBody::Detail(detail)) => {
                let output = detail.output.as_ref();
                if !detail.page_errors.is_empty() {
                    Some(texts(&detail.page_errors))
                } else if !detail.field_errors.is_empty() {
                    Some(field_texts(&detail.field_errors))
                } else if let Some(out) = output.filter(|o| !o.errors.is_empty()) {
                    Some(texts(&out.errors))
                } else if let Some(out) = output.filter(|o| !o.field_errors.is_empty()) {
                    Some(field_texts(&out.field_errors))
                } else {
                    detail.message.clone().map(|m| vec![m])
                }
            }
            None => None,
        };

        from_body
            .or_else(|| self.message.clone().map(|m| vec![m]))
            .or_else(|| self.status_text.clone().map(|m| vec![m]))
            .unwrap_or_default()
            .into_iter()
            .filter(|m| !m.is_empty())
            .collect()
    }

    /// Flattens any number of host errors into non-empty messages.
    pub fn reduce(errors: &[HostError]) -> Vec<String> {
        errors.iter().flat_map(HostError::messages).collect()
    }
}

fn texts(msgs: &[HostMessage]) -> Vec<String> {
    msgs.iter().map(|m| m.message.clone()).collect()
}

fn field_texts(fields: &BTreeMap<String, Vec<HostMessage>>) -> Vec<String> {
    fields
        .values()
        .flatten()
        .map(|m| m.message.clone())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotificationMode {
    #[default]
    Dismissible,
    Sticky,
}

/// A user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub mode: NotificationMode,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            mode: NotificationMode::Dismissible,
        }
    }

    pub fn sticky(mut self) -> Self {
        self.mode = NotificationMode::Sticky;
        self
    }
}

/// Flat field → value update for a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpdate {
    pub record_id: String,
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// What a host needs to present the dependent-field form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCollectionRequest {
    pub record_id: String,
    pub record_type_id: Option<String>,
    pub object_api_name: String,
    pub field_api_name: String,
    pub fields: Vec<String>,
    pub target_value: String,
    pub target_label: String,
    pub description: String,
    pub size: ModalSize,
}

/// How the dependent-field form ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCollectionOutcome {
    Submitted,
    Cancelled,
    Failed(HostError),
}

#[allow(async_fn_in_trait)]
pub trait PersistenceService {
    async fn update_record(&self, update: &RecordUpdate) -> Result<(), HostError>;
}

#[allow(async_fn_in_trait)]
pub trait FlowRunner {
    async fn run_flow(&self, request: &FlowRequest, size: ModalSize) -> FlowOutcome;
}

#[allow(async_fn_in_trait)]
pub trait FieldCollector {
    async fn collect_fields(&self, request: &FieldCollectionRequest) -> FieldCollectionOutcome;
}

/// Fire-and-forget; delivery is not confirmed.
pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

/// All host services a widget needs.
pub trait PathHost: PersistenceService + FlowRunner + FieldCollector + NotificationSink {}

impl<T> PathHost for T where
    T: PersistenceService + FlowRunner + FieldCollector + NotificationSink
{
}
