use crate::domain::value_objects::offline::{LocalId, SyncQueueId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Draft(LocalId),
    Item(LocalId),
    Photo(LocalId),
    QueueEntry(SyncQueueId),
    /// The queue as a whole, when it could not be read.
    SyncQueue,
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Draft(id) => write!(f, "draft:{id}"),
            EntityRef::Item(id) => write!(f, "item:{id}"),
            EntityRef::Photo(id) => write!(f, "photo:{id}"),
            EntityRef::QueueEntry(id) => write!(f, "queue:{id}"),
            EntityRef::SyncQueue => f.write_str("queue"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncErrorEntry {
    pub entity: EntityRef,
    pub message: String,
}

impl fmt::Display for SyncErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.entity, self.message)
    }
}

/// Aggregate outcome of one sync pass.
///
/// `synced` counts drafts marked synced plus queue entries completed; `failed` counts drafts
/// that could not be synced plus queue entries whose attempt failed during the pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub synced: u32,
    pub failed: u32,
    pub errors: Vec<SyncErrorEntry>,
    pub items_synced: u32,
    pub items_failed: u32,
    pub photos_uploaded: u32,
    pub photos_failed: u32,
    pub queue_completed: u32,
    pub queue_retrying: u32,
    pub queue_failed: u32,
}

impl SyncReport {
    pub fn record_error(&mut self, entity: EntityRef, message: impl Into<String>) {
        self.errors.push(SyncErrorEntry {
            entity,
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors_for(&self, entity: &EntityRef) -> impl Iterator<Item = &SyncErrorEntry> + '_ {
        let entity = entity.clone();
        self.errors.iter().filter(move |entry| entry.entity == entity)
    }
}

/// Pushed to progress observers after every draft of a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgress {
    pub total: u32,
    pub completed: u32,
    pub failed: u32,
    pub current: Option<String>,
}
