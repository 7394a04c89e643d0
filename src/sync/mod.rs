//! Sync Layer
//!
//! Owns the caches and drives them from UI signals:
//! - pagination: cursor-based fetch-more with stale-result discard
//! - transition: optimistic item state changes with invalidate-to-reconcile
//! - filter: per-collection domain/path filter context
//! - export: destination helpers for the external export services

mod filter;
mod pagination;
mod transition;

pub mod export;


pub use filter::FilterContext;
pub use pagination::{FetchOutcome, PAGE_SIZE};
pub use transition::{ActionKind, PendingTransition, TransitionKind, TransitionOutcome};

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::api::{AggregateInfo, ApiClient, ApiError};
use crate::cache::{CacheKey, FetchState, InfoCache, ItemCache, Page};
use crate::domain::{CollectionName, ItemId};

/// Errors surfaced by the sync engine.
///
/// None of these are fatal; each is local to one CacheKey or one item.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A page request failed. The view shows an inline error state; retry
    /// is an explicit `fetch_next` or a filter change.
    #[error("page fetch failed for {key}: {source}")]
    Fetch { key: CacheKey, source: ApiError },

    /// An info request failed.
    #[error("info fetch failed for {collection}: {source}")]
    Info {
        collection: CollectionName,
        source: ApiError,
    },

    /// A transition call failed after the optimistic update. The caches
    /// have already been invalidated so the view reconciles with server
    /// truth; no automatic retry.
    #[error("{kind} failed for item {item_id}: {source}")]
    Transition {
        kind: &'static str,
        item_id: ItemId,
        source: ApiError,
    },

    /// The requested kind is meaningless in the item's current collection.
    #[error("{kind} is not allowed from {collection}")]
    NotAllowed {
        kind: &'static str,
        collection: CollectionName,
    },
}

/// External notification collaborator for transition failures.
pub trait Notifier: Send + Sync {
    fn transition_failed(&self, item_id: &ItemId, kind: &'static str, error: &ApiError);
}

struct NullNotifier;

impl Notifier for NullNotifier {
    fn transition_failed(&self, _item_id: &ItemId, _kind: &'static str, _error: &ApiError) {}
}

/// Client-side item-collection synchronization engine.
///
/// Single owner of the item and info caches; the UI reads through the
/// accessors here and never mutates cache state directly. Cheap to clone,
/// all state is shared behind `Arc`.
pub struct SyncEngine<C: ApiClient> {
    pub(crate) api: Arc<C>,
    pub(crate) items: Arc<Mutex<ItemCache>>,
    pub(crate) info: Arc<Mutex<InfoCache>>,
    pub(crate) filters: Arc<Mutex<FilterContext>>,
    pub(crate) processing: Arc<Mutex<HashSet<ItemId>>>,
    pub(crate) notifier: Arc<dyn Notifier>,
}

impl<C: ApiClient> Clone for SyncEngine<C> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            items: self.items.clone(),
            info: self.info.clone(),
            filters: self.filters.clone(),
            processing: self.processing.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<C: ApiClient> SyncEngine<C> {
    pub fn new(api: Arc<C>) -> Self {
        Self::with_notifier(api, Arc::new(NullNotifier))
    }

    pub fn with_notifier(api: Arc<C>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            items: Arc::new(Mutex::new(ItemCache::new())),
            info: Arc::new(Mutex::new(InfoCache::new())),
            filters: Arc::new(Mutex::new(FilterContext::new())),
            processing: Arc::new(Mutex::new(HashSet::new())),
            notifier,
        }
    }

    /// Cached pages for a key, for list rendering.
    pub async fn pages(&self, key: &CacheKey) -> Vec<Page> {
        self.items.lock().await.pages(key).to_vec()
    }

    /// Flattened cached items for a key.
    pub async fn items(&self, key: &CacheKey) -> Vec<crate::domain::Item> {
        self.items.lock().await.items(key)
    }

    /// Fetch state for a key, for spinner/error rendering.
    pub async fn fetch_state(&self, key: &CacheKey) -> FetchState {
        self.items.lock().await.fetch_state(key)
    }

    /// Whether a transition is in flight for this item (busy indicator).
    pub async fn is_processing(&self, item_id: &ItemId) -> bool {
        self.processing.lock().await.contains(item_id)
    }

    /// Mark one key stale; its next read refetches from the start and any
    /// in-flight fetch result for it is discarded.
    pub async fn invalidate(&self, key: &CacheKey) {
        self.items.lock().await.invalidate(key);
    }

    /// Invalidate every cached view of a collection plus its counts.
    pub async fn invalidate_collection(&self, collection: &CollectionName) {
        self.items.lock().await.invalidate_collection(collection);
        self.info.lock().await.invalidate(collection);
    }

    /// Aggregate counts for a collection, fetched lazily and cached until
    /// a transition invalidates them.
    pub async fn info(&self, collection: &CollectionName) -> Result<AggregateInfo, SyncError> {
        let generation = {
            let cache = self.info.lock().await;
            if let Some(info) = cache.cached(collection) {
                return Ok(info.clone());
            }
            cache.generation(collection)
        };

        let fetched = self
            .api
            .fetch_info(collection)
            .await
            .map_err(|source| SyncError::Info {
                collection: collection.clone(),
                source,
            })?;

        // A stale store is refused, but the value is still the freshest
        // read we have, so hand it to the caller either way.
        self.info
            .lock()
            .await
            .store(collection, generation, fetched.clone());
        Ok(fetched)
    }
}
