//! Filter Context
//!
//! Holds the active domain/path filter per collection view. A change
//! invalidates the affected keys and immediately refetches the new view;
//! aggregate counts are untouched (they are always unfiltered).

use std::collections::HashMap;

use crate::api::ApiClient;
use crate::cache::CacheKey;
use crate::domain::CollectionName;

use super::{FetchOutcome, SyncEngine, SyncError};

/// Zero-or-one selected domain (and path) per collection.
#[derive(Debug, Default)]
pub struct FilterContext {
    domains: HashMap<CollectionName, String>,
    paths: HashMap<CollectionName, String>,
}

impl FilterContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain(&self, collection: &CollectionName) -> Option<&str> {
        self.domains.get(collection).map(String::as_str)
    }

    pub fn set_domain(&mut self, collection: CollectionName, domain: Option<String>) {
        match domain {
            Some(domain) => self.domains.insert(collection, domain),
            None => self.domains.remove(&collection),
        };
    }

    pub fn set_path(&mut self, collection: CollectionName, path: Option<String>) {
        match path {
            Some(path) => self.paths.insert(collection, path),
            None => self.paths.remove(&collection),
        };
    }

    /// CacheKey for a collection's currently active view.
    pub fn key_for(&self, collection: &CollectionName) -> CacheKey {
        CacheKey {
            collection: collection.clone(),
            domain_filter: self.domains.get(collection).cloned(),
            path_filter: self.paths.get(collection).cloned(),
        }
    }
}

impl<C: ApiClient> SyncEngine<C> {
    /// Key for the collection view the user is currently looking at.
    pub async fn active_key(&self, collection: &CollectionName) -> CacheKey {
        self.filters.lock().await.key_for(collection)
    }

    /// Currently selected domain filter for a collection.
    pub async fn domain_filter(&self, collection: &CollectionName) -> Option<String> {
        self.filters
            .lock()
            .await
            .domain(collection)
            .map(str::to_string)
    }

    /// Change the domain filter for a collection view.
    ///
    /// The old key's pages are discarded (its generation moves on, so a
    /// late fetch result is dropped too) and exactly one fetch is issued
    /// for the new key's initial cursor.
    pub async fn set_domain_filter(
        &self,
        collection: &CollectionName,
        domain: Option<String>,
    ) -> Result<FetchOutcome, SyncError> {
        let (old_key, new_key) = {
            let mut filters = self.filters.lock().await;
            let old_key = filters.key_for(collection);
            filters.set_domain(collection.clone(), domain);
            (old_key, filters.key_for(collection))
        };

        {
            let mut cache = self.items.lock().await;
            cache.invalidate(&old_key);
            if new_key != old_key {
                // The new view refetches from the start even when it was
                // populated under a previous selection.
                cache.invalidate(&new_key);
            }
        }

        self.fetch_next(&new_key).await
    }

    /// Change the path filter for a collection view. Same reset semantics
    /// as [`Self::set_domain_filter`].
    pub async fn set_path_filter(
        &self,
        collection: &CollectionName,
        path: Option<String>,
    ) -> Result<FetchOutcome, SyncError> {
        let (old_key, new_key) = {
            let mut filters = self.filters.lock().await;
            let old_key = filters.key_for(collection);
            filters.set_path(collection.clone(), path);
            (old_key, filters.key_for(collection))
        };

        {
            let mut cache = self.items.lock().await;
            cache.invalidate(&old_key);
            if new_key != old_key {
                cache.invalidate(&new_key);
            }
        }

        self.fetch_next(&new_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_reflects_selection() {
        let mut filters = FilterContext::new();
        let keep = CollectionName::Keep;
        assert_eq!(filters.key_for(&keep), CacheKey::collection(keep.clone()));

        filters.set_domain(keep.clone(), Some("example.com".to_string()));
        assert_eq!(
            filters.key_for(&keep),
            CacheKey::with_domain(keep.clone(), "example.com")
        );

        filters.set_domain(keep.clone(), None);
        assert_eq!(filters.key_for(&keep), CacheKey::collection(keep));
    }

    #[test]
    fn test_selections_are_per_collection() {
        let mut filters = FilterContext::new();
        filters.set_domain(CollectionName::Keep, Some("example.com".to_string()));
        assert_eq!(filters.domain(&CollectionName::Keep), Some("example.com"));
        assert_eq!(filters.domain(&CollectionName::New), None);
    }
}
