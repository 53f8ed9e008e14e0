pub mod offline;

pub use offline::{
    EntityRef, InspectionDraft, InspectionItem, InspectionPhoto, StoreStats, SyncErrorEntry,
    SyncProgress, SyncQueueEntry, SyncQueueEntryDraft, SyncReport,
};
