use crate::error::MetadataError;
use crate::graph::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::fs;

/// How large the host should render the modal that collects fields or runs a flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalSize {
    #[default]
    Large,
    Full,
}

/// Per-instance configuration of a path widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(alias = "recordId")]
    pub record_id: String,
    #[serde(alias = "objectApiName")]
    pub object_api_name: String,
    #[serde(alias = "fieldApiName")]
    pub field_api_name: String,
    /// Label used in messages until object info supplies one.
    #[serde(default, alias = "fieldLabel")]
    pub field_label: Option<String>,
    #[serde(default = "default_max_depth", alias = "maxDependencyDepth")]
    pub max_dependency_depth: usize,
    #[serde(default, alias = "modalSize")]
    pub modal_size: ModalSize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl WidgetConfig {
    pub fn new(
        record_id: impl Into<String>,
        object_api_name: impl Into<String>,
        field_api_name: impl Into<String>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            object_api_name: object_api_name.into(),
            field_api_name: field_api_name.into(),
            field_label: None,
            max_dependency_depth: DEFAULT_MAX_DEPTH,
            modal_size: ModalSize::default(),
        }
    }

    pub fn with_field_label(mut self, label: impl Into<String>) -> Self {
        self.field_label = Some(label.into());
        self
    }

    pub fn with_max_dependency_depth(mut self, depth: usize) -> Self {
        self.max_dependency_depth = depth;
        self
    }

    pub fn with_modal_size(mut self, size: ModalSize) -> Self {
        self.modal_size = size;
        self
    }

    /// `Object.Field`, the qualified name the host keys field requests by.
    pub fn qualified_field_name(&self) -> String {
        format!("{}.{}", self.object_api_name, self.field_api_name)
    }

    pub fn from_file(path: &str) -> Result<Self, MetadataError> {
        let content = fs::read_to_string(path).map_err(|e| MetadataError::Unavailable {
            source_name: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
