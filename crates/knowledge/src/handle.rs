use std::sync::{Arc, PoisonError, RwLock};

use crate::store::KnowledgeStore;

/// Shared, swappable pointer to the current corpus snapshot.
///
/// Readers clone the `Arc` and score against it without holding the lock, so
/// a concurrent [`StoreHandle::replace`] never affects a call in flight.
#[derive(Debug, Default)]
pub struct StoreHandle {
    current: RwLock<Arc<KnowledgeStore>>,
}

impl StoreHandle {
    pub fn new(store: KnowledgeStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
        }
    }

    /// The snapshot current at the time of the call
    #[must_use]
    pub fn snapshot(&self) -> Arc<KnowledgeStore> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Install `store` as the new snapshot, returning the previous one
    pub fn replace(&self, store: KnowledgeStore) -> Arc<KnowledgeStore> {
        let next = Arc::new(store);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        log::info!(
            "Knowledge store replaced: {} -> {} entries",
            guard.len(),
            next.len()
        );
        std::mem::replace(&mut *guard, next)
    }
}

impl From<KnowledgeStore> for StoreHandle {
    fn from(store: KnowledgeStore) -> Self {
        Self::new(store)
    }
}
