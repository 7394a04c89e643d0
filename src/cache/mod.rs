//! Cache Layer
//!
//! In-memory single source of truth for what the UI displays:
//! - item_cache: keyed, paginated page cache with generation counters
//! - info_cache: lazily filled per-collection aggregate counts
//!
//! Both are plain synchronous state; the sync engine wraps them in
//! `tokio::sync::Mutex` and never holds a lock across an await.

mod info_cache;
mod item_cache;

pub use info_cache::InfoCache;
pub use item_cache::{CacheKey, FetchState, ItemCache, Page, RemovalSnapshot};
