use crate::metadata::PicklistEntry;
use ahash::AHashMap;

/// Positional index over the controlling field's entries for one record type.
///
/// Lookups that miss return `None`; a stale ordinal or a retired value is a
/// normal outcome that callers skip.
#[derive(Debug, Clone, Default)]
pub struct PicklistIndex {
    entries: Vec<PicklistEntry>,
    ordinals: AHashMap<String, usize>,
}

impl PicklistIndex {
    /// Builds the index. When a value repeats, its first ordinal wins.
    pub fn new(entries: Vec<PicklistEntry>) -> Self {
        let mut ordinals = AHashMap::with_capacity(entries.len());
        for (ordinal, entry) in entries.iter().enumerate() {
            ordinals.entry(entry.value.clone()).or_insert(ordinal);
        }
        Self { entries, ordinals }
    }

    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.ordinals.get(value).copied()
    }

    pub fn value_at(&self, ordinal: usize) -> Option<&str> {
        self.entries.get(ordinal).map(|e| e.value.as_str())
    }

    pub fn entry_at(&self, ordinal: usize) -> Option<&PicklistEntry> {
        self.entries.get(ordinal)
    }

    pub fn label_of(&self, value: &str) -> Option<&str> {
        self.index_of(value)
            .and_then(|i| self.entries.get(i))
            .map(|e| e.label.as_str())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.ordinals.contains_key(value)
    }

    /// The entry following `value` by ordinal, if any.
    pub fn next_after(&self, value: &str) -> Option<&PicklistEntry> {
        self.index_of(value).and_then(|i| self.entries.get(i + 1))
    }

    pub fn is_last(&self, value: &str) -> bool {
        self.index_of(value).is_some_and(|i| i + 1 == self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PicklistEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PicklistEntry> {
        self.entries.iter()
    }
}

impl FromIterator<PicklistEntry> for PicklistIndex {
    fn from_iter<T: IntoIterator<Item = PicklistEntry>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
