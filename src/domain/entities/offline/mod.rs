pub mod inspection_draft;
pub mod inspection_item;
pub mod inspection_photo;
pub mod store_stats;
pub mod sync_queue_entry;
pub mod sync_report;

pub use inspection_draft::InspectionDraft;
pub use inspection_item::InspectionItem;
pub use inspection_photo::InspectionPhoto;
pub use store_stats::StoreStats;
pub use sync_queue_entry::{SyncQueueEntry, SyncQueueEntryDraft};
pub use sync_report::{EntityRef, SyncErrorEntry, SyncProgress, SyncReport};
