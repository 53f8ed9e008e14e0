use super::queries::{
    ATTACH_DRAFT_SERVER_ID, CLEAR_TABLES, INSERT_SYNC_ENTRY, MARK_DRAFT_BLOCKED,
    MARK_DRAFT_SYNCED, MARK_ITEM_SYNCED, MARK_PHOTO_FAILED, MARK_PHOTO_UPLOADED,
    SELECT_DRAFTS_WITH_PENDING_CHILDREN, SELECT_DRAFT_BY_LOCAL_ID, SELECT_ITEMS_BY_DRAFT,
    SELECT_ITEM_BY_LOCAL_ID, SELECT_PENDING_SYNC_ENTRIES, SELECT_PHOTOS_BY_DRAFT,
    SELECT_PHOTO_BY_LOCAL_ID, SELECT_STATS, SELECT_SYNC_ENTRY_BY_ID, SELECT_UNSYNCED_DRAFTS,
    UPDATE_SYNC_ENTRY, UPSERT_DRAFT, UPSERT_ITEM, UPSERT_PHOTO,
};
use super::rows::{DraftRow, ItemRow, PhotoRow, StatsRow, SyncQueueRow};
use crate::application::ports::offline_store::InspectionStore;
use crate::domain::entities::offline::{
    InspectionDraft, InspectionItem, InspectionPhoto, StoreStats, SyncQueueEntry,
    SyncQueueEntryDraft,
};
use crate::domain::value_objects::offline::{LocalId, ServerId, SyncQueueId};
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

const LOG_TARGET: &str = "inspection::store";

/// SQLite-backed [`InspectionStore`].
#[derive(Clone)]
pub struct SqliteInspectionStore {
    pool: ConnectionPool,
}

impl SqliteInspectionStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    fn db(&self) -> &SqlitePool {
        self.pool.get_pool()
    }

    async fn require_draft(&self, local_id: &LocalId) -> Result<InspectionDraft, AppError> {
        self.get_draft(local_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("draft {local_id}")))
    }

    async fn require_item(&self, local_id: &LocalId) -> Result<InspectionItem, AppError> {
        self.get_item(local_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {local_id}")))
    }

    async fn require_photo(&self, local_id: &LocalId) -> Result<InspectionPhoto, AppError> {
        self.get_photo(local_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("photo {local_id}")))
    }
}

#[async_trait]
impl InspectionStore for SqliteInspectionStore {
    async fn save_draft(&self, draft: &InspectionDraft) -> Result<InspectionDraft, AppError> {
        draft.validate().map_err(AppError::ValidationError)?;

        let result = sqlx::query(UPSERT_DRAFT)
            .bind(draft.local_id.as_str())
            .bind(draft.lease_id.as_deref())
            .bind(&draft.property_id)
            .bind(draft.kind.as_str())
            .bind(&draft.note)
            .bind(draft.status.as_str())
            .bind(draft.created_at.timestamp_millis())
            .bind(Utc::now().timestamp_millis())
            .execute(self.db())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Immutable(format!(
                "draft {} is already synced",
                draft.local_id
            )));
        }

        tracing::debug!(target: LOG_TARGET, local_id = %draft.local_id, "draft saved");
        self.require_draft(&draft.local_id).await
    }

    async fn save_item(&self, item: &InspectionItem) -> Result<InspectionItem, AppError> {
        let photo_ids = serde_json::to_string(&item.photo_ids)?;

        let result = sqlx::query(UPSERT_ITEM)
            .bind(item.local_id.as_str())
            .bind(item.draft_local_id.as_str())
            .bind(&item.room)
            .bind(&item.label)
            .bind(item.condition.as_str())
            .bind(&item.note)
            .bind(photo_ids)
            .bind(item.created_at.timestamp_millis())
            .bind(Utc::now().timestamp_millis())
            .execute(self.db())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Immutable(format!(
                "item {} is already synced",
                item.local_id
            )));
        }

        tracing::debug!(
            target: LOG_TARGET,
            local_id = %item.local_id,
            draft = %item.draft_local_id,
            "item saved"
        );
        self.require_item(&item.local_id).await
    }

    async fn save_photo(&self, photo: &InspectionPhoto) -> Result<InspectionPhoto, AppError> {
        sqlx::query(UPSERT_PHOTO)
            .bind(photo.local_id.as_str())
            .bind(photo.draft_local_id.as_str())
            .bind(photo.item_local_id.as_ref().map(LocalId::as_str))
            .bind(photo.payload.as_slice())
            .bind(&photo.mime_type)
            .bind(&photo.file_name)
            .bind(photo.created_at.timestamp_millis())
            .execute(self.db())
            .await?;

        tracing::debug!(
            target: LOG_TARGET,
            local_id = %photo.local_id,
            bytes = photo.payload.len(),
            "photo saved"
        );
        self.require_photo(&photo.local_id).await
    }

    async fn get_draft(&self, local_id: &LocalId) -> Result<Option<InspectionDraft>, AppError> {
        sqlx::query_as::<_, DraftRow>(SELECT_DRAFT_BY_LOCAL_ID)
            .bind(local_id.as_str())
            .fetch_optional(self.db())
            .await?
            .map(DraftRow::into_domain)
            .transpose()
    }

    async fn get_item(&self, local_id: &LocalId) -> Result<Option<InspectionItem>, AppError> {
        sqlx::query_as::<_, ItemRow>(SELECT_ITEM_BY_LOCAL_ID)
            .bind(local_id.as_str())
            .fetch_optional(self.db())
            .await?
            .map(ItemRow::into_domain)
            .transpose()
    }

    async fn get_photo(&self, local_id: &LocalId) -> Result<Option<InspectionPhoto>, AppError> {
        sqlx::query_as::<_, PhotoRow>(SELECT_PHOTO_BY_LOCAL_ID)
            .bind(local_id.as_str())
            .fetch_optional(self.db())
            .await?
            .map(PhotoRow::into_domain)
            .transpose()
    }

    async fn get_unsynced_drafts(&self) -> Result<Vec<InspectionDraft>, AppError> {
        let rows = sqlx::query_as::<_, DraftRow>(SELECT_UNSYNCED_DRAFTS)
            .fetch_all(self.db())
            .await?;
        rows.into_iter().map(DraftRow::into_domain).collect()
    }

    async fn get_drafts_with_pending_children(&self) -> Result<Vec<InspectionDraft>, AppError> {
        let rows = sqlx::query_as::<_, DraftRow>(SELECT_DRAFTS_WITH_PENDING_CHILDREN)
            .fetch_all(self.db())
            .await?;
        rows.into_iter().map(DraftRow::into_domain).collect()
    }

    async fn get_items_by_draft(
        &self,
        local_id: &LocalId,
    ) -> Result<Vec<InspectionItem>, AppError> {
        let rows = sqlx::query_as::<_, ItemRow>(SELECT_ITEMS_BY_DRAFT)
            .bind(local_id.as_str())
            .fetch_all(self.db())
            .await?;
        rows.into_iter().map(ItemRow::into_domain).collect()
    }

    async fn get_photos_by_draft(
        &self,
        local_id: &LocalId,
    ) -> Result<Vec<InspectionPhoto>, AppError> {
        let rows = sqlx::query_as::<_, PhotoRow>(SELECT_PHOTOS_BY_DRAFT)
            .bind(local_id.as_str())
            .fetch_all(self.db())
            .await?;
        rows.into_iter().map(PhotoRow::into_domain).collect()
    }

    async fn attach_draft_server_id(
        &self,
        local_id: &LocalId,
        server_id: &ServerId,
    ) -> Result<(), AppError> {
        let result = sqlx::query(ATTACH_DRAFT_SERVER_ID)
            .bind(local_id.as_str())
            .bind(server_id.as_str())
            .bind(Utc::now().timestamp_millis())
            .execute(self.db())
            .await?;

        if result.rows_affected() == 0 {
            let draft = self.require_draft(local_id).await?;
            if draft.server_id.as_ref() != Some(server_id) {
                return Err(AppError::Immutable(format!(
                    "draft {local_id} is already synced"
                )));
            }
        }
        Ok(())
    }

    async fn mark_draft_synced(
        &self,
        local_id: &LocalId,
        server_id: &ServerId,
        revision: i64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(MARK_DRAFT_SYNCED)
            .bind(local_id.as_str())
            .bind(server_id.as_str())
            .bind(Utc::now().timestamp_millis())
            .bind(revision)
            .execute(self.db())
            .await?;

        if result.rows_affected() == 0 {
            let stored = self.require_draft(local_id).await?;
            tracing::debug!(
                target: LOG_TARGET,
                local_id = %local_id,
                expected = revision,
                stored = stored.revision,
                "draft changed since it was read; left unsynced"
            );
            return Ok(false);
        }
        tracing::debug!(target: LOG_TARGET, local_id = %local_id, server_id = %server_id, "draft marked synced");
        Ok(true)
    }

    async fn mark_draft_blocked(&self, local_id: &LocalId, reason: &str) -> Result<(), AppError> {
        let result = sqlx::query(MARK_DRAFT_BLOCKED)
            .bind(local_id.as_str())
            .bind(reason)
            .bind(Utc::now().timestamp_millis())
            .execute(self.db())
            .await?;

        if result.rows_affected() == 0 {
            self.require_draft(local_id).await?;
        }
        Ok(())
    }

    async fn mark_item_synced(
        &self,
        local_id: &LocalId,
        server_id: Option<&ServerId>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(MARK_ITEM_SYNCED)
            .bind(local_id.as_str())
            .bind(server_id.map(ServerId::as_str))
            .bind(Utc::now().timestamp_millis())
            .execute(self.db())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("item {local_id}")));
        }
        Ok(())
    }

    async fn mark_photo_uploaded(
        &self,
        local_id: &LocalId,
        server_path: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query(MARK_PHOTO_UPLOADED)
            .bind(local_id.as_str())
            .bind(server_path)
            .execute(self.db())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("photo {local_id}")));
        }
        Ok(())
    }

    async fn mark_photo_failed(&self, local_id: &LocalId, error: &str) -> Result<(), AppError> {
        let result = sqlx::query(MARK_PHOTO_FAILED)
            .bind(local_id.as_str())
            .bind(error)
            .execute(self.db())
            .await?;

        if result.rows_affected() == 0 {
            self.require_photo(local_id).await?;
        }
        Ok(())
    }

    async fn enqueue_sync_entry(
        &self,
        draft: &SyncQueueEntryDraft,
    ) -> Result<SyncQueueEntry, AppError> {
        let payload = serde_json::to_string(draft.payload.as_json())?;

        let result = sqlx::query(INSERT_SYNC_ENTRY)
            .bind(draft.action_type.as_str())
            .bind(draft.entity_type.as_str())
            .bind(draft.entity_local_id.as_ref().map(LocalId::as_str))
            .bind(payload)
            .bind(Utc::now().timestamp_millis())
            .execute(self.db())
            .await?;

        let id = SyncQueueId::new(result.last_insert_rowid()).map_err(AppError::Internal)?;
        tracing::debug!(target: LOG_TARGET, id = %id, action = %draft.action_type, "sync entry enqueued");

        self.get_sync_entry(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("sync entry {id}")))
    }

    async fn get_sync_entry(&self, id: SyncQueueId) -> Result<Option<SyncQueueEntry>, AppError> {
        sqlx::query_as::<_, SyncQueueRow>(SELECT_SYNC_ENTRY_BY_ID)
            .bind(id.value())
            .fetch_optional(self.db())
            .await?
            .map(SyncQueueRow::into_domain)
            .transpose()
    }

    async fn get_pending_sync_entries(&self) -> Result<Vec<SyncQueueEntry>, AppError> {
        let rows = sqlx::query_as::<_, SyncQueueRow>(SELECT_PENDING_SYNC_ENTRIES)
            .fetch_all(self.db())
            .await?;
        rows.into_iter().map(SyncQueueRow::into_domain).collect()
    }

    async fn update_sync_entry(&self, entry: &SyncQueueEntry) -> Result<(), AppError> {
        let result = sqlx::query(UPDATE_SYNC_ENTRY)
            .bind(entry.id.value())
            .bind(entry.status.as_str())
            .bind(i64::from(entry.retry_count))
            .bind(entry.last_error.as_deref())
            .bind(entry.updated_at.timestamp_millis())
            .execute(self.db())
            .await?;

        if result.rows_affected() == 0 {
            match self.get_sync_entry(entry.id).await? {
                None => return Err(AppError::NotFound(format!("sync entry {}", entry.id))),
                Some(stored) => {
                    tracing::debug!(
                        target: LOG_TARGET,
                        id = %entry.id,
                        status = %stored.status,
                        "ignoring update of terminal sync entry"
                    );
                }
            }
        }
        Ok(())
    }

    async fn get_stats(&self) -> Result<StoreStats, AppError> {
        let row = sqlx::query_as::<_, StatsRow>(SELECT_STATS)
            .fetch_one(self.db())
            .await?;
        Ok(row.into())
    }

    async fn clear_all(&self) -> Result<(), AppError> {
        let mut tx = self.db().begin().await?;
        for statement in CLEAR_TABLES {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::info!(target: LOG_TARGET, "local store cleared");
        Ok(())
    }
}
