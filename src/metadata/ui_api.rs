//! Serde models of the host platform's metadata responses.
//!
//! These mirror the JSON the host's UI API returns and are converted into the
//! canonical [`MetadataSnapshot`] through [`IntoSnapshot`].

use super::conversion::IntoSnapshot;
use super::definition::{
    DependencyNode, DependentEntry, DependentPicklistField, MetadataSnapshot, PathStepConfig,
    PicklistEntry, ValidFor,
};
use crate::error::MetadataError;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Record type name the host reports when a record has no record type.
pub const MASTER_RECORD_TYPE: &str = "__MASTER__";

/// Record type id of the master record type.
pub const MASTER_RECORD_TYPE_ID: &str = "012000000000000AAA";

/// Field value as it appears on a record payload
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FieldValue {
    pub value: Option<String>,
    #[serde(default, alias = "displayValue")]
    pub display_value: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecordTypeInfo {
    pub name: String,
}

/// Record payload carrying the controlling field's committed value
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RecordPayload {
    #[serde(default)]
    pub fields: HashMap<String, FieldValue>,
    #[serde(default, alias = "recordTypeId")]
    pub record_type_id: Option<String>,
    #[serde(default, alias = "recordTypeInfo")]
    pub record_type_info: Option<RecordTypeInfo>,
}

impl RecordPayload {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn record_type_id(&self) -> &str {
        self.record_type_id
            .as_deref()
            .unwrap_or(MASTER_RECORD_TYPE_ID)
    }

    pub fn record_type_name(&self) -> &str {
        self.record_type_info
            .as_ref()
            .map(|info| info.name.as_str())
            .unwrap_or(MASTER_RECORD_TYPE)
    }
}

/// Field description inside an object info payload
#[derive(Debug, Deserialize, Clone)]
pub struct FieldInfo {
    #[serde(default)]
    pub label: String,
}

/// Object info payload: field labels and the untyped native dependency map
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ObjectInfoPayload {
    #[serde(default, alias = "apiName")]
    pub api_name: Option<String>,
    #[serde(default)]
    pub fields: HashMap<String, FieldInfo>,
    #[serde(default, alias = "dependentFields")]
    pub dependent_fields: HashMap<String, serde_json::Value>,
}

impl ObjectInfoPayload {
    pub fn field_label(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(|info| info.label.as_str())
    }

    /// Typed dependency tree rooted at `controlling_field`. Fields without
    /// declared dependents yield an empty tree.
    pub fn dependency_tree(&self, controlling_field: &str) -> DependencyNode {
        self.dependent_fields
            .get(controlling_field)
            .map(DependencyNode::from_json)
            .unwrap_or_default()
    }
}

/// One picklist value on the wire
#[derive(Debug, Deserialize, Clone)]
pub struct PicklistValuePayload {
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, alias = "validFor")]
    pub valid_for: Vec<usize>,
}

/// Picklist values for a single field in one record type
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PicklistValuesPayload {
    #[serde(default)]
    pub values: Vec<PicklistValuePayload>,
    #[serde(default, alias = "controllerValues")]
    pub controller_values: HashMap<String, usize>,
}

impl PicklistValuesPayload {
    pub fn entries(&self) -> Vec<PicklistEntry> {
        self.values
            .iter()
            .map(|v| PicklistEntry::new(v.value.clone(), v.label.clone()))
            .collect()
    }

    fn into_dependent_field(self, field: &str) -> DependentPicklistField {
        DependentPicklistField {
            field: field.to_string(),
            entries: self
                .values
                .into_iter()
                .map(|v| DependentEntry {
                    value: v.value,
                    label: v.label,
                    valid_for: ValidFor::Ordinals(v.valid_for),
                })
                .collect(),
        }
    }
}

/// Picklist values for every picklist field of an object in one record type
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PicklistValuesByRecordTypePayload {
    #[serde(default, alias = "picklistFieldValues")]
    pub picklist_field_values: HashMap<String, PicklistValuesPayload>,
}

impl PicklistValuesByRecordTypePayload {
    /// Dependent picklist data for `field`, if the host shipped any.
    pub fn dependent_field(&self, field: &str) -> Option<DependentPicklistField> {
        self.picklist_field_values
            .get(field)
            .cloned()
            .map(|payload| payload.into_dependent_field(field))
    }

    /// Dependent picklist data for each directly dependent field of `tree`.
    pub fn dependent_fields_for(
        &self,
        tree: &DependencyNode,
    ) -> BTreeMap<String, DependentPicklistField> {
        tree.children()
            .filter_map(|(field, _)| {
                self.dependent_field(field)
                    .map(|data| (field.to_string(), data))
            })
            .collect()
    }
}

/// A full set of host responses for one controlling field.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct UiApiBundle {
    #[serde(alias = "fieldApiName")]
    pub field_api_name: String,
    #[serde(default, alias = "recordTypeId")]
    pub record_type_id: Option<String>,
    #[serde(default, alias = "objectInfo")]
    pub object_info: ObjectInfoPayload,
    #[serde(default, alias = "picklistValues")]
    pub picklist_values: Option<PicklistValuesPayload>,
    #[serde(default, alias = "picklistValuesByRecordType")]
    pub picklist_values_by_record_type: PicklistValuesByRecordTypePayload,
    #[serde(default, alias = "pathSteps")]
    pub path_steps: Vec<PathStepConfig>,
}

impl UiApiBundle {
    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl IntoSnapshot for UiApiBundle {
    fn into_snapshot(self) -> Result<MetadataSnapshot, MetadataError> {
        let controlling = match &self.picklist_values {
            Some(values) => values.entries(),
            None => self
                .picklist_values_by_record_type
                .picklist_field_values
                .get(&self.field_api_name)
                .map(PicklistValuesPayload::entries)
                .ok_or_else(|| MetadataError::MissingField {
                    source_name: "picklistValues".to_string(),
                    field: self.field_api_name.clone(),
                })?,
        };

        let dependencies = self.object_info.dependency_tree(&self.field_api_name);
        let dependent_fields = self
            .picklist_values_by_record_type
            .dependent_fields_for(&dependencies);

        Ok(MetadataSnapshot {
            controlling_field: self.field_api_name,
            record_type_id: self.record_type_id,
            entries: controlling,
            dependencies,
            dependent_fields,
            steps: self.path_steps,
        })
    }
}
