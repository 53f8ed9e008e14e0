use serde::{Deserialize, Serialize};

/// Row counts of the local store. Derived and possibly stale; only for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub drafts_total: u64,
    pub drafts_unsynced: u64,
    pub items_total: u64,
    pub items_unsynced: u64,
    pub photos_total: u64,
    pub photos_unsynced: u64,
    pub queue_pending: u64,
    pub queue_failed: u64,
}

impl StoreStats {
    pub fn pending_total(&self) -> u64 {
        self.drafts_unsynced + self.items_unsynced + self.photos_unsynced + self.queue_pending
    }
}
