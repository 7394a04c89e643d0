//! Aggregate Info Cache
//!
//! Lazily filled per-collection counts, invalidated by the transition
//! engine whenever a transition settles (the count may have changed on
//! either outcome).

use std::collections::HashMap;

use crate::api::AggregateInfo;
use crate::domain::CollectionName;

#[derive(Debug, Default)]
struct InfoEntry {
    info: Option<AggregateInfo>,
    generation: u64,
}

/// Per-collection [`AggregateInfo`] cache.
#[derive(Debug, Default)]
pub struct InfoCache {
    entries: HashMap<CollectionName, InfoEntry>,
}

impl InfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, collection: &CollectionName) -> Option<&AggregateInfo> {
        self.entries.get(collection).and_then(|e| e.info.as_ref())
    }

    pub fn generation(&self, collection: &CollectionName) -> u64 {
        self.entries.get(collection).map(|e| e.generation).unwrap_or(0)
    }

    /// Store a fetched info result issued under `generation`. Results from
    /// before the last invalidation are discarded; returns whether it was kept.
    pub fn store(
        &mut self,
        collection: &CollectionName,
        generation: u64,
        info: AggregateInfo,
    ) -> bool {
        let entry = self.entries.entry(collection.clone()).or_default();
        if entry.generation != generation {
            log::debug!(
                "discarding stale info for {} (gen {} != {})",
                collection,
                generation,
                entry.generation
            );
            return false;
        }
        entry.info = Some(info);
        true
    }

    /// Drop the cached counts so the next read refetches.
    pub fn invalidate(&mut self, collection: &CollectionName) {
        let entry = self.entries.entry(collection.clone()).or_default();
        entry.generation += 1;
        entry.info = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(total: u64) -> AggregateInfo {
        AggregateInfo {
            total_count: total,
            group_infos: vec![],
        }
    }

    #[test]
    fn test_store_and_invalidate() {
        let mut cache = InfoCache::new();
        let keep = CollectionName::Keep;
        assert!(cache.cached(&keep).is_none());

        assert!(cache.store(&keep, 0, info(10)));
        assert_eq!(cache.cached(&keep).unwrap().total_count, 10);

        cache.invalidate(&keep);
        assert!(cache.cached(&keep).is_none());
    }

    #[test]
    fn test_stale_store_discarded() {
        let mut cache = InfoCache::new();
        let keep = CollectionName::Keep;
        let generation = cache.generation(&keep);

        cache.invalidate(&keep);
        assert!(!cache.store(&keep, generation, info(10)));
        assert!(cache.cached(&keep).is_none());
    }

    #[test]
    fn test_double_invalidation_is_safe() {
        let mut cache = InfoCache::new();
        let keep = CollectionName::Keep;
        cache.store(&keep, 0, info(10));
        cache.invalidate(&keep);
        cache.invalidate(&keep);
        assert!(cache.cached(&keep).is_none());
    }
}
