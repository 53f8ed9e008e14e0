use crate::domain::value_objects::offline::{DraftStatus, InspectionKind, LocalId, ServerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inspection session authored on the device.
///
/// `sequence` is assigned by the store on first insert and defines processing order.
/// `revision` is bumped by the store on every save and is not meant to be set by callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectionDraft {
    pub sequence: Option<i64>,
    pub local_id: LocalId,
    pub server_id: Option<ServerId>,
    pub lease_id: Option<String>,
    pub property_id: String,
    pub kind: InspectionKind,
    pub note: String,
    pub status: DraftStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced: bool,
    pub blocked_reason: Option<String>,
    #[serde(default)]
    pub revision: i64,
}

impl InspectionDraft {
    pub fn new(property_id: impl Into<String>, kind: InspectionKind) -> Self {
        let now = Utc::now();
        Self {
            sequence: None,
            local_id: LocalId::generate(),
            server_id: None,
            lease_id: None,
            property_id: property_id.into(),
            kind,
            note: String::new(),
            status: DraftStatus::Draft,
            created_at: now,
            updated_at: now,
            synced: false,
            blocked_reason: None,
            revision: 0,
        }
    }

    pub fn with_lease(mut self, lease_id: impl Into<String>) -> Self {
        self.lease_id = Some(lease_id.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked_reason.is_some()
    }

    pub fn describe(&self) -> String {
        format!(
            "{} inspection for property {}",
            self.kind.as_str().replace('_', "-"),
            self.property_id
        )
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.property_id.trim().is_empty() {
            return Err("Draft property_id cannot be empty".to_string());
        }
        if self.synced && self.server_id.is_none() {
            return Err("A synced draft must carry a server id".to_string());
        }
        Ok(())
    }
}
