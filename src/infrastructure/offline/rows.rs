use crate::domain::entities::offline::{
    InspectionDraft, InspectionItem, InspectionPhoto, StoreStats, SyncQueueEntry,
};
use crate::domain::value_objects::offline::{
    DraftStatus, EntityType, InspectionKind, ItemCondition, LocalId, OfflinePayload,
    PhotoSyncState, ServerId, SyncActionType, SyncQueueId, SyncQueueStatus,
};
use crate::shared::error::AppError;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct DraftRow {
    pub seq: i64,
    pub local_id: String,
    pub server_id: Option<String>,
    pub lease_id: Option<String>,
    pub property_id: String,
    pub kind: String,
    pub note: String,
    pub status: String,
    pub synced: bool,
    pub blocked_reason: Option<String>,
    pub revision: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DraftRow {
    pub fn into_domain(self) -> Result<InspectionDraft, AppError> {
        Ok(InspectionDraft {
            sequence: Some(self.seq),
            local_id: local_id(self.local_id)?,
            server_id: self.server_id.map(server_id).transpose()?,
            lease_id: self.lease_id,
            property_id: self.property_id,
            kind: self
                .kind
                .parse::<InspectionKind>()
                .map_err(AppError::DeserializationError)?,
            note: self.note,
            status: self
                .status
                .parse::<DraftStatus>()
                .map_err(AppError::DeserializationError)?,
            created_at: timestamp(self.created_at)?,
            updated_at: timestamp(self.updated_at)?,
            synced: self.synced,
            blocked_reason: self.blocked_reason,
            revision: self.revision,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub seq: i64,
    pub local_id: String,
    pub draft_local_id: String,
    pub room: String,
    pub label: String,
    pub condition: String,
    pub note: String,
    pub photo_ids: String,
    pub synced: bool,
    pub server_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ItemRow {
    pub fn into_domain(self) -> Result<InspectionItem, AppError> {
        let photo_ids: Vec<LocalId> = serde_json::from_str(&self.photo_ids)
            .map_err(|err| AppError::DeserializationError(format!("photo_ids: {err}")))?;

        Ok(InspectionItem {
            sequence: Some(self.seq),
            local_id: local_id(self.local_id)?,
            draft_local_id: local_id(self.draft_local_id)?,
            room: self.room,
            label: self.label,
            condition: self
                .condition
                .parse::<ItemCondition>()
                .map_err(AppError::DeserializationError)?,
            note: self.note,
            photo_ids,
            synced: self.synced,
            server_id: self.server_id.map(server_id).transpose()?,
            created_at: timestamp(self.created_at)?,
            updated_at: timestamp(self.updated_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PhotoRow {
    pub seq: i64,
    pub local_id: String,
    pub draft_local_id: String,
    pub item_local_id: Option<String>,
    pub payload: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
    pub sync_state: String,
    pub server_path: Option<String>,
    pub upload_attempts: i64,
    pub last_error: Option<String>,
    pub created_at: i64,
}

impl PhotoRow {
    pub fn into_domain(self) -> Result<InspectionPhoto, AppError> {
        Ok(InspectionPhoto {
            sequence: Some(self.seq),
            local_id: local_id(self.local_id)?,
            draft_local_id: local_id(self.draft_local_id)?,
            item_local_id: self.item_local_id.map(local_id).transpose()?,
            payload: self.payload,
            mime_type: self.mime_type,
            file_name: self.file_name,
            sync_state: self
                .sync_state
                .parse::<PhotoSyncState>()
                .map_err(AppError::DeserializationError)?,
            server_path: self.server_path,
            upload_attempts: u32::try_from(self.upload_attempts).unwrap_or(u32::MAX),
            last_error: self.last_error,
            created_at: timestamp(self.created_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SyncQueueRow {
    pub id: i64,
    pub action_type: String,
    pub entity_type: String,
    pub entity_local_id: Option<String>,
    pub payload: String,
    pub status: String,
    pub retry_count: i64,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SyncQueueRow {
    pub fn into_domain(self) -> Result<SyncQueueEntry, AppError> {
        Ok(SyncQueueEntry {
            id: SyncQueueId::new(self.id).map_err(AppError::DeserializationError)?,
            action_type: SyncActionType::from(self.action_type.as_str()),
            entity_type: EntityType::new(self.entity_type)
                .map_err(AppError::DeserializationError)?,
            entity_local_id: self.entity_local_id.map(local_id).transpose()?,
            payload: OfflinePayload::from_json_str(&self.payload)
                .map_err(AppError::DeserializationError)?,
            status: SyncQueueStatus::from(self.status.as_str()),
            retry_count: u32::try_from(self.retry_count).unwrap_or(0),
            last_error: self.last_error,
            created_at: timestamp(self.created_at)?,
            updated_at: timestamp(self.updated_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StatsRow {
    pub drafts_total: i64,
    pub drafts_unsynced: i64,
    pub items_total: i64,
    pub items_unsynced: i64,
    pub photos_total: i64,
    pub photos_unsynced: i64,
    pub queue_pending: i64,
    pub queue_failed: i64,
}

impl From<StatsRow> for StoreStats {
    fn from(row: StatsRow) -> Self {
        let count = |value: i64| u64::try_from(value).unwrap_or(0);
        StoreStats {
            drafts_total: count(row.drafts_total),
            drafts_unsynced: count(row.drafts_unsynced),
            items_total: count(row.items_total),
            items_unsynced: count(row.items_unsynced),
            photos_total: count(row.photos_total),
            photos_unsynced: count(row.photos_unsynced),
            queue_pending: count(row.queue_pending),
            queue_failed: count(row.queue_failed),
        }
    }
}

fn local_id(value: String) -> Result<LocalId, AppError> {
    LocalId::new(value).map_err(AppError::DeserializationError)
}

fn server_id(value: String) -> Result<ServerId, AppError> {
    ServerId::new(value).map_err(AppError::DeserializationError)
}

fn timestamp(millis: i64) -> Result<DateTime<Utc>, AppError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| AppError::DeserializationError(format!("Invalid timestamp: {millis}")))
}
