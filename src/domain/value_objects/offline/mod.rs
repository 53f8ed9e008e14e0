pub mod draft_status;
pub mod entity_type;
pub mod inspection_kind;
pub mod item_condition;
pub mod local_id;
pub mod payload;
pub mod photo_sync_state;
pub mod server_id;
pub mod sync_action_type;
pub mod sync_queue_id;
pub mod sync_queue_status;

pub use draft_status::DraftStatus;
pub use entity_type::EntityType;
pub use inspection_kind::InspectionKind;
pub use item_condition::ItemCondition;
pub use local_id::LocalId;
pub use payload::OfflinePayload;
pub use photo_sync_state::PhotoSyncState;
pub use server_id::ServerId;
pub use sync_action_type::SyncActionType;
pub use sync_queue_id::SyncQueueId;
pub use sync_queue_status::SyncQueueStatus;
