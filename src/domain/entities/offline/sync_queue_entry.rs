use crate::domain::value_objects::offline::{
    EntityType, LocalId, OfflinePayload, SyncActionType, SyncQueueId, SyncQueueStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deferred action that does not belong to the draft/item/photo hierarchy.
///
/// Status only moves forward: `pending -> processing -> {completed | pending | failed}`.
/// Once an entry is `completed` or `failed` the transition methods leave it untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncQueueEntry {
    pub id: SyncQueueId,
    pub action_type: SyncActionType,
    pub entity_type: EntityType,
    pub entity_local_id: Option<LocalId>,
    pub payload: OfflinePayload,
    pub status: SyncQueueStatus,
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncQueueEntry {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn mark_processing(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = SyncQueueStatus::Processing;
        self.updated_at = Utc::now();
        true
    }

    pub fn mark_completed(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = SyncQueueStatus::Completed;
        self.updated_at = Utc::now();
        true
    }

    /// Counts a failed attempt. Reaching `max_retries` makes the failure terminal.
    pub fn record_failure(&mut self, error: impl Into<String>, max_retries: u32) -> &SyncQueueStatus {
        if !self.is_terminal() {
            self.retry_count = self.retry_count.saturating_add(1);
            self.last_error = Some(error.into());
            self.status = if self.retry_count >= max_retries {
                SyncQueueStatus::Failed
            } else {
                SyncQueueStatus::Pending
            };
            self.updated_at = Utc::now();
        }
        &self.status
    }

    /// Fails the entry immediately without spending a retry.
    pub fn mark_unhandled(&mut self, error: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = SyncQueueStatus::Failed;
        self.last_error = Some(error.into());
        self.updated_at = Utc::now();
        true
    }
}

/// Input for enqueueing a new action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncQueueEntryDraft {
    pub action_type: SyncActionType,
    pub entity_type: EntityType,
    pub entity_local_id: Option<LocalId>,
    pub payload: OfflinePayload,
}

impl SyncQueueEntryDraft {
    pub fn new(
        action_type: SyncActionType,
        entity_type: EntityType,
        entity_local_id: Option<LocalId>,
        payload: OfflinePayload,
    ) -> Self {
        Self {
            action_type,
            entity_type,
            entity_local_id,
            payload,
        }
    }
}
