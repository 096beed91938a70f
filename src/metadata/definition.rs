use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single value of the controlling picklist. Its position in the owning
/// list is its ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PicklistEntry {
    pub value: String,
    pub label: String,
}

impl PicklistEntry {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A native field-dependency tree.
///
/// The root node of a controlling field lists its directly dependent fields;
/// each child in turn lists the fields that depend on it. A field with no
/// dependents of its own is a `Leaf`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, DependencyNode>",
    into = "BTreeMap<String, DependencyNode>"
)]
pub enum DependencyNode {
    #[default]
    Leaf,
    Branch(BTreeMap<String, DependencyNode>),
}

impl DependencyNode {
    /// Builds a branch from `(field, node)` pairs. An empty iterator yields a leaf.
    pub fn branch<I, S>(children: I) -> Self
    where
        I: IntoIterator<Item = (S, DependencyNode)>,
        S: Into<String>,
    {
        let children: BTreeMap<String, DependencyNode> = children
            .into_iter()
            .map(|(name, node)| (name.into(), node))
            .collect();
        Self::from(children)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            DependencyNode::Leaf => true,
            DependencyNode::Branch(children) => children.is_empty(),
        }
    }

    /// Iterates the direct children in name order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &DependencyNode)> {
        let map = match self {
            DependencyNode::Leaf => None,
            DependencyNode::Branch(children) => Some(children),
        };
        map.into_iter()
            .flat_map(|children| children.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn child(&self, field: &str) -> Option<&DependencyNode> {
        match self {
            DependencyNode::Leaf => None,
            DependencyNode::Branch(children) => children.get(field),
        }
    }

    /// Converts an untyped host payload into a typed tree.
    ///
    /// Objects become branches (an empty object is a leaf). Arrays and scalars
    /// are leaves and are never traversed.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => DependencyNode::branch(
                map.iter()
                    .map(|(field, nested)| (field.clone(), DependencyNode::from_json(nested))),
            ),
            _ => DependencyNode::Leaf,
        }
    }
}

impl From<BTreeMap<String, DependencyNode>> for DependencyNode {
    fn from(children: BTreeMap<String, DependencyNode>) -> Self {
        if children.is_empty() {
            DependencyNode::Leaf
        } else {
            DependencyNode::Branch(children)
        }
    }
}

impl From<DependencyNode> for BTreeMap<String, DependencyNode> {
    fn from(node: DependencyNode) -> Self {
        match node {
            DependencyNode::Leaf => BTreeMap::new(),
            DependencyNode::Branch(children) => children,
        }
    }
}

/// Which controlling values a dependent entry is selectable for.
///
/// Hosts either ship the ordinals already decoded or the raw base64 bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidFor {
    Ordinals(Vec<usize>),
    Bitmask(String),
}

impl Default for ValidFor {
    fn default() -> Self {
        ValidFor::Ordinals(Vec::new())
    }
}

/// One value of a dependent picklist together with its valid-for data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentEntry {
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, alias = "validFor")]
    pub valid_for: ValidFor,
}

impl DependentEntry {
    pub fn valid_for(value: impl Into<String>, ordinals: Vec<usize>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
            valid_for: ValidFor::Ordinals(ordinals),
        }
    }
}

/// A dependent picklist field and its entries, scoped to one record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentPicklistField {
    pub field: String,
    #[serde(default, alias = "values")]
    pub entries: Vec<DependentEntry>,
}

/// Author-configured behavior for one value of the controlling field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStepConfig {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    #[serde(default, alias = "keyFields")]
    pub key_fields: Vec<String>,
    #[serde(default, alias = "runFlow")]
    pub run_flow: bool,
    #[serde(
        default,
        alias = "flowApiName",
        skip_serializing_if = "Option::is_none"
    )]
    pub flow_api_name: Option<String>,
    #[serde(default, alias = "flowValid")]
    pub flow_valid: bool,
    #[serde(default, alias = "dependentFields")]
    pub dependent_fields: Vec<String>,
}

impl PathStepConfig {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_dependent_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependent_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_flow(mut self, flow_api_name: impl Into<String>, flow_valid: bool) -> Self {
        self.run_flow = true;
        self.flow_api_name = Some(flow_api_name.into());
        self.flow_valid = flow_valid;
        self
    }
}

/// Everything the resolver needs for one controlling field in one record-type
/// context. Snapshots are read-only and replaced wholesale on refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    #[serde(alias = "controllingField")]
    pub controlling_field: String,
    #[serde(
        default,
        alias = "recordTypeId",
        skip_serializing_if = "Option::is_none"
    )]
    pub record_type_id: Option<String>,
    pub entries: Vec<PicklistEntry>,
    #[serde(default)]
    pub dependencies: DependencyNode,
    #[serde(default, alias = "dependentFields")]
    pub dependent_fields: BTreeMap<String, DependentPicklistField>,
    #[serde(default)]
    pub steps: Vec<PathStepConfig>,
}
