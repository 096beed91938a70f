use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Controlling value → fields that become required when that value is chosen.
///
/// Union is the only way fields get in, so building a map is order-independent
/// and merging is commutative and idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDependencyMap {
    inner: AHashMap<String, AHashSet<String>>,
}

impl ResolvedDependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions `fields` into the set held for `value`.
    pub fn insert_all<I, S>(&mut self, value: &str, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = fields.into_iter().map(Into::into).peekable();
        if fields.peek().is_none() {
            return;
        }
        self.inner
            .entry(value.to_string())
            .or_default()
            .extend(fields);
    }

    /// Unions every entry of `other` into `self`.
    pub fn merge(&mut self, other: ResolvedDependencyMap) {
        for (value, fields) in other.inner {
            self.inner.entry(value).or_default().extend(fields);
        }
    }

    pub fn merged(mut self, other: ResolvedDependencyMap) -> Self {
        self.merge(other);
        self
    }

    pub fn fields_for(&self, value: &str) -> Option<&AHashSet<String>> {
        self.inner.get(value)
    }

    /// Fields required for `value`, sorted by name. Empty when none are.
    pub fn sorted_fields_for(&self, value: &str) -> Vec<String> {
        self.inner
            .get(value)
            .map(|fields| fields.iter().sorted().cloned().collect())
            .unwrap_or_default()
    }

    pub fn requires_fields(&self, value: &str) -> bool {
        self.inner.get(value).is_some_and(|f| !f.is_empty())
    }

    pub fn contains_value(&self, value: &str) -> bool {
        self.inner.contains_key(value)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AHashSet<String>)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Deterministic view for display and serialization.
    pub fn to_sorted(&self) -> BTreeMap<String, Vec<String>> {
        self.inner
            .iter()
            .map(|(value, fields)| (value.clone(), fields.iter().sorted().cloned().collect()))
            .collect()
    }
}

impl Serialize for ResolvedDependencyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_sorted().serialize(serializer)
    }
}

impl<V, F> FromIterator<(V, F)> for ResolvedDependencyMap
where
    V: AsRef<str>,
    F: IntoIterator,
    F::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (V, F)>>(iter: T) -> Self {
        let mut map = ResolvedDependencyMap::new();
        for (value, fields) in iter {
            map.insert_all(value.as_ref(), fields);
        }
        map
    }
}
