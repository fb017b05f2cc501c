use std::collections::HashMap;

use crate::entry::KnowledgeEntry;
use crate::error::{KnowledgeError, Result};
use crate::record::EntryRecord;

/// Immutable collection of validated entries with unique ids.
///
/// Entries keep their load order. Nothing mutates a store after construction;
/// reloads build a new store and swap it in through [`crate::StoreHandle`].
#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    entries: Vec<KnowledgeEntry>,
    by_id: HashMap<String, usize>,
}

/// A record rejected by [`KnowledgeStore::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position in the input
    pub index: usize,
    pub error: KnowledgeError,
}

/// Outcome of a lenient load
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub store: KnowledgeStore,
    pub skipped: Vec<SkippedRecord>,
}

impl KnowledgeStore {
    /// An empty corpus
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate every record, failing on the first bad or duplicate one
    pub fn try_from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = EntryRecord>,
    {
        let mut store = Self::default();
        for record in records {
            let entry = KnowledgeEntry::try_from(record)?;
            store.push(entry)?;
        }
        log::info!("Knowledge store loaded: {} entries", store.len());
        Ok(store)
    }

    /// Validate every record, skipping bad and duplicate ones with a warning
    pub fn load<I>(records: I) -> LoadReport
    where
        I: IntoIterator<Item = EntryRecord>,
    {
        let mut store = Self::default();
        let mut skipped = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let outcome = KnowledgeEntry::try_from(record).and_then(|entry| store.push(entry));
            if let Err(error) = outcome {
                log::warn!("Skipping corpus record #{index}: {error}");
                skipped.push(SkippedRecord { index, error });
            }
        }

        log::info!(
            "Knowledge store loaded: {} entries, {} skipped",
            store.len(),
            skipped.len()
        );
        LoadReport { store, skipped }
    }

    /// Build from already-validated entries
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = KnowledgeEntry>,
    {
        let mut store = Self::default();
        for entry in entries {
            store.push(entry)?;
        }
        Ok(store)
    }

    fn push(&mut self, entry: KnowledgeEntry) -> Result<()> {
        if self.by_id.contains_key(entry.id()) {
            return Err(KnowledgeError::DuplicateId(entry.id().to_string()));
        }
        self.by_id.insert(entry.id().to_string(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&KnowledgeEntry> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }

    /// All entries in load order
    #[must_use]
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnowledgeEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a KnowledgeStore {
    type Item = &'a KnowledgeEntry;
    type IntoIter = std::slice::Iter<'a, KnowledgeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
