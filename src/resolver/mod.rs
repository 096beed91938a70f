use crate::error::ResolveError;
use crate::graph::DEFAULT_MAX_DEPTH;
use crate::metadata::MetadataSnapshot;
use crate::picklist::PicklistIndex;
use crate::validity::{DefaultValidityDecoder, ValidityDecoder};
use std::sync::Arc;

mod map;
mod native;

pub use map::ResolvedDependencyMap;
use native::NativePass;

/// Output of a resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Controlling value → required fields.
    pub dependencies: ResolvedDependencyMap,
    /// Dependent fields left out because their nested tree was malformed.
    pub skipped: Vec<ResolveError>,
}

/// Computes, for each controlling value, the fields that must be collected
/// before that value can be committed.
///
/// Native dependencies come from the platform's dependency tree and the
/// valid-for data of each directly dependent field. Custom dependencies come
/// from the path step configuration and apply to their value unconditionally.
pub struct DependencyResolver {
    snapshot: MetadataSnapshot,
    index: PicklistIndex,
    decoder: Arc<dyn ValidityDecoder>,
    max_depth: usize,
}

pub struct ResolverBuilder {
    snapshot: MetadataSnapshot,
    decoder: Arc<dyn ValidityDecoder>,
    max_depth: usize,
}

impl ResolverBuilder {
    pub fn new(snapshot: MetadataSnapshot) -> Self {
        Self {
            snapshot,
            decoder: Arc::new(DefaultValidityDecoder),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Replaces the valid-for decoding strategy.
    pub fn with_decoder(mut self, decoder: impl ValidityDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Like [`with_decoder`](Self::with_decoder) for a strategy shared with
    /// other resolvers.
    pub fn with_shared_decoder(mut self, decoder: Arc<dyn ValidityDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn build(self) -> DependencyResolver {
        let index = PicklistIndex::new(self.snapshot.entries.clone());
        DependencyResolver {
            snapshot: self.snapshot,
            index,
            decoder: self.decoder,
            max_depth: self.max_depth,
        }
    }
}

impl DependencyResolver {
    pub fn builder(snapshot: MetadataSnapshot) -> ResolverBuilder {
        ResolverBuilder::new(snapshot)
    }

    /// Resolver with the default decoder and depth bound.
    pub fn new(snapshot: MetadataSnapshot) -> Self {
        ResolverBuilder::new(snapshot).build()
    }

    pub fn index(&self) -> &PicklistIndex {
        &self.index
    }

    pub fn snapshot(&self) -> &MetadataSnapshot {
        &self.snapshot
    }

    /// Runs both passes and unions their results.
    pub fn resolve(&self) -> Resolution {
        let (native, skipped) = self.resolve_native();
        let dependencies = native.merged(self.resolve_custom());

        tracing::info!(
            field = %self.snapshot.controlling_field,
            record_type = self.snapshot.record_type_id.as_deref().unwrap_or("-"),
            values = dependencies.len(),
            skipped = skipped.len(),
            "Resolved field dependencies by picklist value"
        );
        tracing::debug!(resolved = ?dependencies.to_sorted());

        Resolution {
            dependencies,
            skipped,
        }
    }

    /// Native dependencies only, plus the fields skipped as malformed.
    pub fn resolve_native(&self) -> (ResolvedDependencyMap, Vec<ResolveError>) {
        NativePass::new(
            &self.index,
            &self.snapshot.dependent_fields,
            self.decoder.as_ref(),
            self.max_depth,
        )
        .run(&self.snapshot.dependencies)
    }

    /// Custom dependencies declared on path step configs.
    ///
    /// Configs for values the current picklist does not contain are ignored so
    /// that every key of the result is a live controlling value.
    pub fn resolve_custom(&self) -> ResolvedDependencyMap {
        let mut result = ResolvedDependencyMap::new();
        for step in &self.snapshot.steps {
            if step.dependent_fields.is_empty() {
                continue;
            }
            if !self.index.contains(&step.value) {
                tracing::debug!(
                    value = %step.value,
                    "Ignoring step config for a value outside the current picklist"
                );
                continue;
            }
            result.insert_all(&step.value, step.dependent_fields.iter().cloned());
        }
        result
    }
}
