use super::map::ResolvedDependencyMap;
use crate::error::ResolveError;
use crate::graph;
use crate::metadata::{DependencyNode, DependentPicklistField};
use crate::picklist::PicklistIndex;
use crate::validity::{self, ValidityDecoder};
use itertools::Itertools;
use std::collections::BTreeMap;

/// Attributes natively dependent fields to the controlling values they are
/// constrained by.
pub(super) struct NativePass<'a> {
    index: &'a PicklistIndex,
    dependent_fields: &'a BTreeMap<String, DependentPicklistField>,
    decoder: &'a dyn ValidityDecoder,
    max_depth: usize,
}

impl<'a> NativePass<'a> {
    pub(super) fn new(
        index: &'a PicklistIndex,
        dependent_fields: &'a BTreeMap<String, DependentPicklistField>,
        decoder: &'a dyn ValidityDecoder,
        max_depth: usize,
    ) -> Self {
        Self {
            index,
            dependent_fields,
            decoder,
            max_depth,
        }
    }

    /// Runs the pass over every direct child of `tree`. Fields whose nested
    /// tree is malformed are left out and reported in the returned errors.
    pub(super) fn run(
        &self,
        tree: &DependencyNode,
    ) -> (ResolvedDependencyMap, Vec<ResolveError>) {
        let mut result = ResolvedDependencyMap::new();
        let mut skipped = Vec::new();

        for (field, nested) in tree.children() {
            if let Err(e) = self.attribute_field(field, nested, &mut result) {
                tracing::error!(field, error = %e, "Skipping dependent field");
                skipped.push(e);
            }
        }
        (result, skipped)
    }

    fn attribute_field(
        &self,
        field: &str,
        nested: &DependencyNode,
        result: &mut ResolvedDependencyMap,
    ) -> Result<(), ResolveError> {
        let Some(data) = self.dependent_fields.get(field) else {
            tracing::debug!(field, "No picklist data for dependent field; skipping");
            return Ok(());
        };

        let ordinals = validity::valid_ordinals(self.decoder, data);
        if ordinals.is_empty() {
            return Ok(());
        }

        // Flatten before touching `result` so a malformed tree leaves no trace.
        let mut required = vec![field.to_string()];
        if !nested.is_empty() {
            required.extend(graph::flatten(field, nested, self.max_depth)?);
        }

        for ordinal in ordinals.into_iter().sorted() {
            match self.index.value_at(ordinal) {
                Some(value) => result.insert_all(value, required.iter().cloned()),
                None => tracing::debug!(field, ordinal, "Skipping stale controlling ordinal"),
            }
        }
        Ok(())
    }
}
