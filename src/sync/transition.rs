//! Transition Engine
//!
//! Applies a user-requested state change to one item and keeps the caches
//! consistent on both outcomes. The optimistic removal is never rolled
//! back from its snapshot; success and failure alike invalidate the source
//! collection's item and info caches so the next read reflects server
//! truth.

use crate::api::{ApiClient, ApiError};
use crate::cache::RemovalSnapshot;
use crate::domain::{CollectionName, Item, ItemId};

use super::export::drop_folder_path;
use super::{SyncEngine, SyncError};

/// A user-requested item state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionKind {
    /// Move to `trash`.
    Trash,
    /// Return a trashed item to its pre-trash collection.
    Restore,
    /// Permanently delete.
    Delete,
    /// Move to `keep`.
    Keep,
    /// Create a record in the tagging bookmark service (Raindrop);
    /// the item stays in its source collection.
    RaindropExport {
        collection_id: String,
        title: Option<String>,
    },
    /// Create a record in the bookmark collection service; the item stays
    /// in its source collection.
    BookmarkExport {
        collection_id: String,
        title: Option<String>,
    },
    /// Copy the linked file into the cloud-storage drop folder.
    DropFolderExport,
}

impl TransitionKind {
    pub fn name(&self) -> &'static str {
        match self {
            TransitionKind::Trash => "trash",
            TransitionKind::Restore => "restore",
            TransitionKind::Delete => "delete",
            TransitionKind::Keep => "keep",
            TransitionKind::RaindropExport { .. } => "raindrop-export",
            TransitionKind::BookmarkExport { .. } => "bookmark-export",
            TransitionKind::DropFolderExport => "drop-folder-export",
        }
    }

    /// Whether the item is optimistically removed from its source
    /// collection's cache. Exports leave the item in place.
    pub fn removes_from_source(&self) -> bool {
        matches!(
            self,
            TransitionKind::Trash
                | TransitionKind::Restore
                | TransitionKind::Delete
                | TransitionKind::Keep
        )
    }

    /// Whether this kind makes sense for an item in `collection`.
    pub fn allowed_in(&self, collection: &CollectionName) -> bool {
        match self {
            // In trash the trash button means permanent delete instead.
            TransitionKind::Trash => collection != &CollectionName::Trash,
            TransitionKind::Restore => collection == &CollectionName::Trash,
            TransitionKind::Delete => true,
            TransitionKind::Keep => !matches!(
                collection,
                CollectionName::Keep | CollectionName::Bookmark | CollectionName::Trash
            ),
            TransitionKind::RaindropExport { .. }
            | TransitionKind::BookmarkExport { .. }
            | TransitionKind::DropFolderExport => collection != &CollectionName::Trash,
        }
    }
}

/// Result of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The call went out and the caches were reconciled.
    Applied,
    /// The item already had a transition in flight; the re-entrant request
    /// was ignored, not queued.
    AlreadyProcessing,
}

/// Ephemeral record of an in-flight transition; dropped at settle.
#[derive(Debug)]
pub struct PendingTransition {
    pub item_id: ItemId,
    pub from: CollectionName,
    pub kind: TransitionKind,
    /// Snapshot from the optimistic removal. Failure reconciles by cache
    /// invalidation, not by restoring this; it exists for callers that
    /// want precise rollback.
    pub snapshot: Option<RemovalSnapshot>,
}

/// Per-item card action, for conditional icon rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Restore,
    Trash,
    Delete,
    Keep,
    RaindropExport,
    BookmarkExport,
    CopyLink,
    DropFolderExport,
}

impl ActionKind {
    /// Whether the action's icon is shown for items of `collection`.
    pub fn available_in(&self, collection: &CollectionName) -> bool {
        let trash = collection == &CollectionName::Trash;
        let gallery = collection == &CollectionName::Gallery;
        match self {
            ActionKind::Restore => trash,
            // The same button slot: trash-move everywhere, permanent
            // delete inside trash and in the gallery grid.
            ActionKind::Trash => !trash && !gallery,
            ActionKind::Delete => trash || gallery,
            ActionKind::Keep => !matches!(
                collection,
                CollectionName::Keep | CollectionName::Bookmark | CollectionName::Trash
            ),
            ActionKind::RaindropExport | ActionKind::BookmarkExport | ActionKind::CopyLink => {
                !trash
            }
            ActionKind::DropFolderExport => gallery,
        }
    }
}

impl<C: ApiClient> SyncEngine<C> {
    /// Apply a transition to one item.
    ///
    /// Protocol: set the item's processing flag (re-entrant requests are
    /// no-ops), optimistically remove the item from the active view where
    /// the kind calls for it, issue the external call, then on either
    /// outcome invalidate the source collection's item and info caches and
    /// clear the flag. Invalidation is idempotent, so the settle pass
    /// re-invalidating after the outcome pass is safe.
    pub async fn apply(
        &self,
        item: &Item,
        kind: TransitionKind,
    ) -> Result<TransitionOutcome, SyncError> {
        if !kind.allowed_in(&item.collection) {
            return Err(SyncError::NotAllowed {
                kind: kind.name(),
                collection: item.collection.clone(),
            });
        }

        {
            let mut processing = self.processing.lock().await;
            if !processing.insert(item.id.clone()) {
                log::debug!("transition already in flight for item {}, ignoring", item.id);
                return Ok(TransitionOutcome::AlreadyProcessing);
            }
        }

        let key = self.active_key(&item.collection).await;
        let snapshot = if kind.removes_from_source() {
            self.items.lock().await.remove_item(&key, &item.id)
        } else {
            None
        };
        let pending = PendingTransition {
            item_id: item.id.clone(),
            from: item.collection.clone(),
            kind: kind.clone(),
            snapshot,
        };

        let result = self.execute(item, &kind).await;

        // Both outcomes reconcile the same way: server re-read is
        // authoritative, the optimistic guess is not trusted to self-heal.
        self.invalidate_collection(&pending.from).await;
        if let Err(err) = &result {
            log::error!("{} failed for item {}: {}", kind.name(), item.id, err);
            self.notifier.transition_failed(&pending.item_id, kind.name(), err);
        }

        // Settle: idempotent re-invalidation, flag cleared, snapshot dropped.
        self.invalidate_collection(&pending.from).await;
        self.processing.lock().await.remove(&pending.item_id);

        match result {
            Ok(()) => Ok(TransitionOutcome::Applied),
            Err(source) => Err(SyncError::Transition {
                kind: kind.name(),
                item_id: item.id.clone(),
                source,
            }),
        }
    }

    async fn execute(&self, item: &Item, kind: &TransitionKind) -> Result<(), ApiError> {
        match kind {
            TransitionKind::Trash => self.api.move_to_trash(item).await,
            TransitionKind::Restore => self.api.restore(item).await,
            TransitionKind::Delete => {
                self.api.delete_permanently(&item.id, &item.collection).await
            }
            TransitionKind::Keep => self.api.move_to_keep(item).await,
            TransitionKind::RaindropExport {
                collection_id,
                title,
            } => {
                let exported = with_export_title(item, title.as_deref());
                self.api.export_to_tag_service(&exported, collection_id).await
            }
            TransitionKind::BookmarkExport {
                collection_id,
                title,
            } => {
                let exported = with_export_title(item, title.as_deref());
                self.api
                    .export_to_bookmark_collection(&exported, collection_id)
                    .await
            }
            TransitionKind::DropFolderExport => {
                let path = drop_folder_path(&item.text_content, &item.url);
                self.api.save_to_drop_folder(&path, &item.url).await
            }
        }
    }
}

/// Clone of the item carrying the possibly-edited export title; an empty
/// or absent edit keeps the original text content.
fn with_export_title(item: &Item, title: Option<&str>) -> Item {
    let mut exported = item.clone();
    if let Some(title) = title {
        if !title.is_empty() {
            exported.text_content = title.to_string();
        }
    }
    exported
}
