pub mod connectivity;
pub mod offline_service;
pub mod retry_queue;
pub mod sync_service;

pub use connectivity::{ConnectivityEvent, ConnectivityMonitor, OnlineCallback};
pub use offline_service::{OfflineInspectionService, SyncStatusSnapshot};
pub use retry_queue::{
    ActionDispatch, QueueOutcome, RetryQueueProcessor, SyncActionHandler, MAX_RETRIES,
};
pub use sync_service::{ProgressCallback, SyncOrchestrator};
