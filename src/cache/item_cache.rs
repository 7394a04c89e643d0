//! Item Store
//!
//! Per-CacheKey page cache. Every mutation that discards data bumps the
//! key's generation counter; in-flight fetches carry the generation they
//! were issued under and are silently dropped when it no longer matches.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::{CollectionName, Item, ItemId};

/// Composite identifier for one paginated view.
///
/// Any filter change produces a distinct key; entries for different keys
/// are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub collection: CollectionName,
    pub domain_filter: Option<String>,
    pub path_filter: Option<String>,
}

impl CacheKey {
    /// Key for an unfiltered collection view.
    pub fn collection(collection: CollectionName) -> Self {
        Self {
            collection,
            domain_filter: None,
            path_filter: None,
        }
    }

    pub fn with_domain(collection: CollectionName, domain: impl Into<String>) -> Self {
        Self {
            collection,
            domain_filter: Some(domain.into()),
            path_filter: None,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection)?;
        if let Some(domain) = &self.domain_filter {
            write!(f, "?domain={}", domain)?;
        }
        if let Some(path) = &self.path_filter {
            let sep = if self.domain_filter.is_some() { '&' } else { '?' };
            write!(f, "{}path={}", sep, path)?;
        }
        Ok(())
    }
}

/// One fetched slice of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Item>,
    /// Offset this page was fetched at.
    pub cursor: u64,
    /// Whether a further page may exist after this one.
    pub has_more: bool,
}

/// Fetch state machine per CacheKey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Fetching,
    Error,
}

/// Everything needed to reinsert an optimistically removed item at its
/// original page and position.
#[derive(Debug, Clone)]
pub struct RemovalSnapshot {
    pub key: CacheKey,
    pub item: Item,
    page_index: usize,
    item_index: usize,
    generation: u64,
}

#[derive(Debug, Default)]
struct CacheEntry {
    pages: Vec<Page>,
    generation: u64,
    state: FetchState,
    exhausted: bool,
}

impl CacheEntry {
    fn reset(&mut self) {
        self.generation += 1;
        self.pages.clear();
        self.state = FetchState::Idle;
        self.exhausted = false;
    }
}

/// Keyed, paginated in-memory item cache.
#[derive(Debug, Default)]
pub struct ItemCache {
    entries: HashMap<CacheKey, CacheEntry>,
}

impl ItemCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(&mut self, key: &CacheKey) -> &mut CacheEntry {
        self.entries.entry(key.clone()).or_default()
    }

    /// Cached pages for a key, in fetch order; empty if never fetched.
    pub fn pages(&self, key: &CacheKey) -> &[Page] {
        self.entries.get(key).map(|e| e.pages.as_slice()).unwrap_or(&[])
    }

    /// All cached items for a key, flattened across pages.
    pub fn items(&self, key: &CacheKey) -> Vec<Item> {
        self.pages(key)
            .iter()
            .flat_map(|p| p.items.iter().cloned())
            .collect()
    }

    /// Current generation for a key (0 when never touched).
    pub fn generation(&self, key: &CacheKey) -> u64 {
        self.entries.get(key).map(|e| e.generation).unwrap_or(0)
    }

    pub fn fetch_state(&self, key: &CacheKey) -> FetchState {
        self.entries.get(key).map(|e| e.state).unwrap_or_default()
    }

    pub fn set_fetch_state(&mut self, key: &CacheKey, state: FetchState) {
        self.entry_mut(key).state = state;
    }

    /// Whether the key's last page was short; halts auto-fetch until
    /// the next invalidation.
    pub fn is_exhausted(&self, key: &CacheKey) -> bool {
        self.entries.get(key).map(|e| e.exhausted).unwrap_or(false)
    }

    /// Cursor the next fetch should start at.
    pub fn next_cursor(&self, key: &CacheKey, page_size: u64) -> u64 {
        self.pages(key)
            .last()
            .map(|p| p.cursor + page_size)
            .unwrap_or(0)
    }

    /// Append a page fetched under `generation`. A result issued before the
    /// key's last invalidation is discarded; returns whether it was kept.
    pub fn append_page(&mut self, key: &CacheKey, generation: u64, page: Page) -> bool {
        let entry = self.entry_mut(key);
        if entry.generation != generation {
            log::debug!("discarding stale page for {} (gen {} != {})", key, generation, entry.generation);
            return false;
        }
        entry.exhausted = !page.has_more;
        entry.pages.push(page);
        true
    }

    /// Mark one key stale: drop its pages and bump its generation so any
    /// in-flight fetch result is discarded. Idempotent per call site.
    pub fn invalidate(&mut self, key: &CacheKey) {
        self.entry_mut(key).reset();
    }

    /// Invalidate every key under a collection, whatever its filters.
    pub fn invalidate_collection(&mut self, collection: &CollectionName) {
        for (key, entry) in self.entries.iter_mut() {
            if &key.collection == collection {
                entry.reset();
            }
        }
    }

    /// Synchronously remove an item from the cached pages under `key`,
    /// recording enough to reinsert it on rollback.
    pub fn remove_item(&mut self, key: &CacheKey, item_id: &ItemId) -> Option<RemovalSnapshot> {
        let entry = self.entries.get_mut(key)?;
        for (page_index, page) in entry.pages.iter_mut().enumerate() {
            if let Some(item_index) = page.items.iter().position(|i| &i.id == item_id) {
                let item = page.items.remove(item_index);
                return Some(RemovalSnapshot {
                    key: key.clone(),
                    item,
                    page_index,
                    item_index,
                    generation: entry.generation,
                });
            }
        }
        None
    }

    /// Reinsert an item at its recorded position. Refuses when the key has
    /// been invalidated since the snapshot was taken; returns whether the
    /// item was put back.
    pub fn restore_snapshot(&mut self, snapshot: RemovalSnapshot) -> bool {
        let entry = match self.entries.get_mut(&snapshot.key) {
            Some(entry) if entry.generation == snapshot.generation => entry,
            _ => return false,
        };
        let Some(page) = entry.pages.get_mut(snapshot.page_index) else {
            return false;
        };
        let at = snapshot.item_index.min(page.items.len());
        page.items.insert(at, snapshot.item);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> CacheKey {
        CacheKey::collection(CollectionName::Keep)
    }

    fn item(id: &str) -> Item {
        Item::new(id, format!("https://example.com/{id}"), "example.com", CollectionName::Keep)
    }

    fn page(cursor: u64, ids: &[&str], has_more: bool) -> Page {
        Page {
            items: ids.iter().map(|id| item(id)).collect(),
            cursor,
            has_more,
        }
    }

    #[test]
    fn test_pages_accumulate_in_call_order() {
        let mut cache = ItemCache::new();
        assert!(cache.append_page(&key(), 0, page(0, &["a", "b"], true)));
        assert!(cache.append_page(&key(), 0, page(20, &["c"], false)));

        let cursors: Vec<u64> = cache.pages(&key()).iter().map(|p| p.cursor).collect();
        assert_eq!(cursors, vec![0, 20]);
        let ids: Vec<ItemId> = cache.items(&key()).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_short_page_exhausts_key() {
        let mut cache = ItemCache::new();
        cache.append_page(&key(), 0, page(0, &["a"], true));
        assert!(!cache.is_exhausted(&key()));
        cache.append_page(&key(), 0, page(20, &["b"], false));
        assert!(cache.is_exhausted(&key()));
    }

    #[test]
    fn test_next_cursor_advances_by_page_size() {
        let mut cache = ItemCache::new();
        assert_eq!(cache.next_cursor(&key(), 20), 0);
        cache.append_page(&key(), 0, page(0, &["a"], true));
        assert_eq!(cache.next_cursor(&key(), 20), 20);
    }

    #[test]
    fn test_stale_append_is_discarded() {
        let mut cache = ItemCache::new();
        let generation = cache.generation(&key());
        cache.invalidate(&key());

        assert!(!cache.append_page(&key(), generation, page(0, &["a"], true)));
        assert!(cache.pages(&key()).is_empty());
    }

    #[test]
    fn test_invalidate_clears_pages_and_exhaustion() {
        let mut cache = ItemCache::new();
        cache.append_page(&key(), 0, page(0, &["a"], false));
        assert!(cache.is_exhausted(&key()));

        cache.invalidate(&key());
        assert!(cache.pages(&key()).is_empty());
        assert!(!cache.is_exhausted(&key()));
        assert_eq!(cache.next_cursor(&key(), 20), 0);
    }

    #[test]
    fn test_invalidate_collection_spares_other_collections() {
        let mut cache = ItemCache::new();
        let filtered = CacheKey::with_domain(CollectionName::Keep, "example.com");
        let other = CacheKey::collection(CollectionName::New);
        cache.append_page(&key(), 0, page(0, &["a"], true));
        cache.append_page(&filtered, 0, page(0, &["a"], true));
        cache.append_page(&other, 0, page(0, &["x"], true));

        cache.invalidate_collection(&CollectionName::Keep);
        assert!(cache.pages(&key()).is_empty());
        assert!(cache.pages(&filtered).is_empty());
        assert_eq!(cache.pages(&other).len(), 1);
    }

    #[test]
    fn test_remove_and_restore_round_trip() {
        let mut cache = ItemCache::new();
        cache.append_page(&key(), 0, page(0, &["a", "b", "c"], true));

        let snapshot = cache.remove_item(&key(), &"b".to_string()).unwrap();
        let ids: Vec<ItemId> = cache.items(&key()).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["a", "c"]);

        assert!(cache.restore_snapshot(snapshot));
        let ids: Vec<ItemId> = cache.items(&key()).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_restore_refused_after_invalidation() {
        let mut cache = ItemCache::new();
        cache.append_page(&key(), 0, page(0, &["a"], true));
        let snapshot = cache.remove_item(&key(), &"a".to_string()).unwrap();

        cache.invalidate(&key());
        assert!(!cache.restore_snapshot(snapshot));
        assert!(cache.pages(&key()).is_empty());
    }

    #[test]
    fn test_cache_key_display() {
        assert_eq!(key().to_string(), "keep");
        assert_eq!(
            CacheKey::with_domain(CollectionName::New, "example.com").to_string(),
            "new?domain=example.com"
        );
    }
}
