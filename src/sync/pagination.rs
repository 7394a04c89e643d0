//! Pagination Engine
//!
//! Cursor-based fetch-more per CacheKey. Exactly one fetch may be in
//! flight per key; results are tagged with the key's generation at issue
//! time and discarded when it has moved on.

use crate::api::ApiClient;
use crate::cache::{CacheKey, FetchState, Page};

use super::{SyncEngine, SyncError};

/// Items requested per page.
pub const PAGE_SIZE: u64 = 20;

/// What a fetch request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page with this many items was appended.
    Fetched(usize),
    /// A fetch for this key was already in flight; the request was a no-op.
    InFlight,
    /// The key is exhausted; auto-fetch stays halted until invalidation.
    Exhausted,
    /// The key is in the error state; waiting for an explicit retry.
    Errored,
    /// The result arrived for a superseded generation and was discarded.
    Stale,
}

impl<C: ApiClient> SyncEngine<C> {
    /// Fetch the next page for a key.
    ///
    /// Cursor is the last page's cursor advanced by [`PAGE_SIZE`], or 0 on
    /// a cold key. A short page exhausts the key. Callable from the error
    /// state as the explicit retry path.
    pub async fn fetch_next(&self, key: &CacheKey) -> Result<FetchOutcome, SyncError> {
        let (cursor, generation) = {
            let mut cache = self.items.lock().await;
            if cache.fetch_state(key) == FetchState::Fetching {
                return Ok(FetchOutcome::InFlight);
            }
            if cache.is_exhausted(key) {
                return Ok(FetchOutcome::Exhausted);
            }
            let cursor = cache.next_cursor(key, PAGE_SIZE);
            let generation = cache.generation(key);
            cache.set_fetch_state(key, FetchState::Fetching);
            (cursor, generation)
        };

        let result = self
            .api
            .fetch_page(
                &key.collection,
                cursor,
                key.domain_filter.as_deref(),
                key.path_filter.as_deref(),
            )
            .await;

        let mut cache = self.items.lock().await;
        if cache.generation(key) != generation {
            // The key was invalidated while we were in flight; whatever
            // owns it now (possibly a newer fetch) is not ours to touch.
            log::debug!("stale fetch for {} discarded", key);
            return Ok(FetchOutcome::Stale);
        }

        match result {
            Ok(items) => {
                let count = items.len();
                let page = Page {
                    items,
                    cursor,
                    has_more: count as u64 == PAGE_SIZE,
                };
                cache.append_page(key, generation, page);
                cache.set_fetch_state(key, FetchState::Idle);
                log::debug!("fetched {} items for {} at cursor {}", count, key, cursor);
                Ok(FetchOutcome::Fetched(count))
            }
            Err(source) => {
                cache.set_fetch_state(key, FetchState::Error);
                Err(SyncError::Fetch {
                    key: key.clone(),
                    source,
                })
            }
        }
    }

    /// Scroll-proximity signal from the viewport observer.
    ///
    /// Fetches only when the key is idle with more pages expected; never
    /// auto-retries out of the error state.
    pub async fn on_viewport_near_end(&self, key: &CacheKey) -> Result<FetchOutcome, SyncError> {
        {
            let cache = self.items.lock().await;
            match cache.fetch_state(key) {
                FetchState::Fetching => return Ok(FetchOutcome::InFlight),
                FetchState::Error => return Ok(FetchOutcome::Errored),
                FetchState::Idle => {}
            }
            if cache.is_exhausted(key) {
                return Ok(FetchOutcome::Exhausted);
            }
        }
        self.fetch_next(key).await
    }
}
