use crate::domain::value_objects::offline::{ItemCondition, LocalId, ServerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectionItem {
    pub sequence: Option<i64>,
    pub local_id: LocalId,
    pub draft_local_id: LocalId,
    pub room: String,
    pub label: String,
    pub condition: ItemCondition,
    pub note: String,
    /// Ordered references into the photo collection.
    pub photo_ids: Vec<LocalId>,
    pub synced: bool,
    pub server_id: Option<ServerId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InspectionItem {
    pub fn new(
        draft_local_id: LocalId,
        room: impl Into<String>,
        label: impl Into<String>,
        condition: ItemCondition,
    ) -> Self {
        let now = Utc::now();
        Self {
            sequence: None,
            local_id: LocalId::generate(),
            draft_local_id,
            room: room.into(),
            label: label.into(),
            condition,
            note: String::new(),
            photo_ids: Vec::new(),
            synced: false,
            server_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_photos(mut self, photo_ids: Vec<LocalId>) -> Self {
        self.photo_ids = photo_ids;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
