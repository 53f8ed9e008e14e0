use async_trait::async_trait;
use inspection_sync::application::ports::offline_store::InspectionStore;
use inspection_sync::domain::entities::offline::{
    InspectionDraft, InspectionItem, InspectionPhoto, StoreStats, SyncQueueEntry,
    SyncQueueEntryDraft,
};
use inspection_sync::domain::value_objects::offline::{LocalId, ServerId, SyncQueueId};
use inspection_sync::AppError;
use std::sync::Arc;

/// Delegates to a real store, except that the sync queue cannot be read.
pub struct QueueOutageStore {
    inner: Arc<dyn InspectionStore>,
}

impl QueueOutageStore {
    pub fn wrap(inner: Arc<dyn InspectionStore>) -> Arc<Self> {
        Arc::new(Self { inner })
    }
}

#[async_trait]
impl InspectionStore for QueueOutageStore {
    async fn save_draft(&self, draft: &InspectionDraft) -> Result<InspectionDraft, AppError> {
        self.inner.save_draft(draft).await
    }

    async fn save_item(&self, item: &InspectionItem) -> Result<InspectionItem, AppError> {
        self.inner.save_item(item).await
    }

    async fn save_photo(&self, photo: &InspectionPhoto) -> Result<InspectionPhoto, AppError> {
        self.inner.save_photo(photo).await
    }

    async fn get_draft(&self, local_id: &LocalId) -> Result<Option<InspectionDraft>, AppError> {
        self.inner.get_draft(local_id).await
    }

    async fn get_item(&self, local_id: &LocalId) -> Result<Option<InspectionItem>, AppError> {
        self.inner.get_item(local_id).await
    }

    async fn get_photo(&self, local_id: &LocalId) -> Result<Option<InspectionPhoto>, AppError> {
        self.inner.get_photo(local_id).await
    }

    async fn get_unsynced_drafts(&self) -> Result<Vec<InspectionDraft>, AppError> {
        self.inner.get_unsynced_drafts().await
    }

    async fn get_drafts_with_pending_children(&self) -> Result<Vec<InspectionDraft>, AppError> {
        self.inner.get_drafts_with_pending_children().await
    }

    async fn get_items_by_draft(
        &self,
        local_id: &LocalId,
    ) -> Result<Vec<InspectionItem>, AppError> {
        self.inner.get_items_by_draft(local_id).await
    }

    async fn get_photos_by_draft(
        &self,
        local_id: &LocalId,
    ) -> Result<Vec<InspectionPhoto>, AppError> {
        self.inner.get_photos_by_draft(local_id).await
    }

    async fn attach_draft_server_id(
        &self,
        local_id: &LocalId,
        server_id: &ServerId,
    ) -> Result<(), AppError> {
        self.inner.attach_draft_server_id(local_id, server_id).await
    }

    async fn mark_draft_synced(
        &self,
        local_id: &LocalId,
        server_id: &ServerId,
        revision: i64,
    ) -> Result<bool, AppError> {
        self.inner
            .mark_draft_synced(local_id, server_id, revision)
            .await
    }

    async fn mark_draft_blocked(&self, local_id: &LocalId, reason: &str) -> Result<(), AppError> {
        self.inner.mark_draft_blocked(local_id, reason).await
    }

    async fn mark_item_synced(
        &self,
        local_id: &LocalId,
        server_id: Option<&ServerId>,
    ) -> Result<(), AppError> {
        self.inner.mark_item_synced(local_id, server_id).await
    }

    async fn mark_photo_uploaded(
        &self,
        local_id: &LocalId,
        server_path: &str,
    ) -> Result<(), AppError> {
        self.inner.mark_photo_uploaded(local_id, server_path).await
    }

    async fn mark_photo_failed(&self, local_id: &LocalId, error: &str) -> Result<(), AppError> {
        self.inner.mark_photo_failed(local_id, error).await
    }

    async fn enqueue_sync_entry(
        &self,
        draft: &SyncQueueEntryDraft,
    ) -> Result<SyncQueueEntry, AppError> {
        self.inner.enqueue_sync_entry(draft).await
    }

    async fn get_sync_entry(&self, id: SyncQueueId) -> Result<Option<SyncQueueEntry>, AppError> {
        self.inner.get_sync_entry(id).await
    }

    async fn get_pending_sync_entries(&self) -> Result<Vec<SyncQueueEntry>, AppError> {
        Err(AppError::Database("sync_queue: disk I/O error".into()))
    }

    async fn update_sync_entry(&self, entry: &SyncQueueEntry) -> Result<(), AppError> {
        self.inner.update_sync_entry(entry).await
    }

    async fn get_stats(&self) -> Result<StoreStats, AppError> {
        self.inner.get_stats().await
    }

    async fn clear_all(&self) -> Result<(), AppError> {
        self.inner.clear_all().await
    }
}
