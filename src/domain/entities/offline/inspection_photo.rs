use crate::domain::value_objects::offline::{LocalId, PhotoSyncState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectionPhoto {
    pub sequence: Option<i64>,
    pub local_id: LocalId,
    pub draft_local_id: LocalId,
    pub item_local_id: Option<LocalId>,
    #[serde(skip)]
    pub payload: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
    pub sync_state: PhotoSyncState,
    pub server_path: Option<String>,
    pub upload_attempts: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InspectionPhoto {
    pub fn new(
        draft_local_id: LocalId,
        item_local_id: Option<LocalId>,
        payload: Vec<u8>,
        mime_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            sequence: None,
            local_id: LocalId::generate(),
            draft_local_id,
            item_local_id,
            payload,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
            sync_state: PhotoSyncState::Pending,
            server_path: None,
            upload_attempts: 0,
            last_error: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_synced(&self) -> bool {
        self.sync_state == PhotoSyncState::Uploaded && self.server_path.is_some()
    }
}
