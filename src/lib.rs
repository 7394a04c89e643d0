//! Applemint Sync Engine
//!
//! Layered architecture:
//! - domain: Core entities (items, collections)
//! - api: External API-client collaborator (trait + HTTP implementation)
//! - cache: Keyed page cache and aggregate info cache
//! - sync: Pagination, transitions and filter handling on top of the caches
//!
//! The UI layer is a read-only consumer: it renders cached pages, per-item
//! processing flags and collection info, and calls back into [`SyncEngine`]
//! with scroll-proximity signals, filter changes and user actions.

pub mod api;
pub mod cache;
pub mod domain;
pub mod sync;

pub use api::{AggregateInfo, ApiClient, ApiError, GroupInfo, HttpApiClient, RaindropCollection};
pub use cache::{CacheKey, FetchState, InfoCache, ItemCache, Page, RemovalSnapshot};
pub use domain::{CollectionName, Item, ItemId};
pub use sync::{
    ActionKind, FetchOutcome, FilterContext, Notifier, PendingTransition, SyncEngine, SyncError,
    TransitionKind, TransitionOutcome, PAGE_SIZE,
};
