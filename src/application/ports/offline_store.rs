use crate::domain::entities::offline::{
    InspectionDraft, InspectionItem, InspectionPhoto, StoreStats, SyncQueueEntry,
    SyncQueueEntryDraft,
};
use crate::domain::value_objects::offline::{LocalId, ServerId, SyncQueueId};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable local persistence for offline-authored inspections and the deferred action queue.
///
/// Every method is one atomic operation against the backing store. An unavailable backend
/// surfaces as [`AppError::StorageUnavailable`].
#[async_trait]
pub trait InspectionStore: Send + Sync {
    /// Upserts by `local_id`. Fails with [`AppError::Immutable`] once the draft is synced.
    /// Saving clears a previous `blocked_reason`.
    async fn save_draft(&self, draft: &InspectionDraft) -> Result<InspectionDraft, AppError>;
    /// Upserts by `local_id`. Fails with [`AppError::Immutable`] once the item is synced.
    async fn save_item(&self, item: &InspectionItem) -> Result<InspectionItem, AppError>;
    async fn save_photo(&self, photo: &InspectionPhoto) -> Result<InspectionPhoto, AppError>;

    async fn get_draft(&self, local_id: &LocalId) -> Result<Option<InspectionDraft>, AppError>;
    async fn get_item(&self, local_id: &LocalId) -> Result<Option<InspectionItem>, AppError>;
    async fn get_photo(&self, local_id: &LocalId) -> Result<Option<InspectionPhoto>, AppError>;

    /// Unsynced, unblocked drafts in creation order.
    async fn get_unsynced_drafts(&self) -> Result<Vec<InspectionDraft>, AppError>;
    /// Synced drafts that still own unsynced items or photos not yet uploaded, in creation order.
    async fn get_drafts_with_pending_children(&self) -> Result<Vec<InspectionDraft>, AppError>;
    async fn get_items_by_draft(
        &self,
        local_id: &LocalId,
    ) -> Result<Vec<InspectionItem>, AppError>;
    async fn get_photos_by_draft(
        &self,
        local_id: &LocalId,
    ) -> Result<Vec<InspectionPhoto>, AppError>;

    async fn attach_draft_server_id(
        &self,
        local_id: &LocalId,
        server_id: &ServerId,
    ) -> Result<(), AppError>;
    /// Marks the draft synced only if it is still at `revision`. Returns `false` when the draft
    /// was saved again since that revision; it then stays unsynced.
    async fn mark_draft_synced(
        &self,
        local_id: &LocalId,
        server_id: &ServerId,
        revision: i64,
    ) -> Result<bool, AppError>;
    async fn mark_draft_blocked(&self, local_id: &LocalId, reason: &str) -> Result<(), AppError>;
    async fn mark_item_synced(
        &self,
        local_id: &LocalId,
        server_id: Option<&ServerId>,
    ) -> Result<(), AppError>;
    async fn mark_photo_uploaded(
        &self,
        local_id: &LocalId,
        server_path: &str,
    ) -> Result<(), AppError>;
    async fn mark_photo_failed(&self, local_id: &LocalId, error: &str) -> Result<(), AppError>;

    async fn enqueue_sync_entry(
        &self,
        draft: &SyncQueueEntryDraft,
    ) -> Result<SyncQueueEntry, AppError>;
    async fn get_sync_entry(&self, id: SyncQueueId) -> Result<Option<SyncQueueEntry>, AppError>;
    /// Non-terminal entries (`pending`, and `processing` left behind by a crash) in FIFO order.
    async fn get_pending_sync_entries(&self) -> Result<Vec<SyncQueueEntry>, AppError>;
    async fn update_sync_entry(&self, entry: &SyncQueueEntry) -> Result<(), AppError>;

    async fn get_stats(&self) -> Result<StoreStats, AppError>;
    async fn clear_all(&self) -> Result<(), AppError>;
}
