use super::definition::MetadataSnapshot;
use crate::error::MetadataError;
use std::fs;

/// A trait for host payloads that can be converted into a `MetadataSnapshot`.
///
/// This is the extension point for feeding the resolver from a host whose wire
/// format differs from the canonical snapshot. Implement it on the structs you
/// deserialize your host's responses into.
///
/// # Example
///
/// ```rust
/// use waypost::error::MetadataError;
/// use waypost::metadata::{IntoSnapshot, MetadataSnapshot, PicklistEntry};
///
/// struct MyStages {
///     field: String,
///     names: Vec<String>,
/// }
///
/// impl IntoSnapshot for MyStages {
///     fn into_snapshot(self) -> Result<MetadataSnapshot, MetadataError> {
///         Ok(MetadataSnapshot {
///             controlling_field: self.field,
///             entries: self
///                 .names
///                 .into_iter()
///                 .map(|n| PicklistEntry::new(n.clone(), n))
///                 .collect(),
///             ..Default::default()
///         })
///     }
/// }
///
/// let snapshot = MyStages { field: "Stage".into(), names: vec!["New".into()] }
///     .into_snapshot()
///     .unwrap();
/// assert_eq!(snapshot.entries.len(), 1);
/// ```
pub trait IntoSnapshot {
    /// Consumes the payload and converts it into the canonical snapshot.
    fn into_snapshot(self) -> Result<MetadataSnapshot, MetadataError>;
}

impl IntoSnapshot for MetadataSnapshot {
    fn into_snapshot(self) -> Result<MetadataSnapshot, MetadataError> {
        Ok(self)
    }
}

impl MetadataSnapshot {
    /// Parses a snapshot in the canonical JSON layout.
    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a canonical snapshot from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, MetadataError> {
        let content = fs::read_to_string(path).map_err(|e| MetadataError::Unavailable {
            source_name: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }
}
