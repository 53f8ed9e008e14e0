use super::connectivity::{ConnectivityMonitor, OnlineCallback};
use super::sync_service::{ProgressCallback, SyncOrchestrator};
use crate::application::ports::offline_store::InspectionStore;
use crate::domain::entities::offline::{
    InspectionDraft, InspectionItem, InspectionPhoto, StoreStats, SyncProgress, SyncQueueEntry,
    SyncQueueEntryDraft, SyncReport,
};
use crate::shared::error::AppError;
use crate::shared::metrics::SyncMetricsSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const LOG_TARGET: &str = "inspection::sync";

/// What the UI observes about synchronization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusSnapshot {
    pub is_syncing: bool,
    pub progress: Option<SyncProgress>,
    pub last_report: Option<SyncReport>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub persistence_enabled: bool,
}

struct Persistence {
    store: Arc<dyn InspectionStore>,
    orchestrator: Arc<SyncOrchestrator>,
}

/// Entry points used by the inspection screens.
///
/// Writes go straight to the local store and never touch the network. When the store could
/// not be opened the service runs with persistence disabled: store-backed calls fail with
/// [`AppError::StorageUnavailable`] and [`OfflineInspectionService::trigger_sync`] does nothing.
pub struct OfflineInspectionService {
    persistence: Result<Persistence, String>,
    monitor: Arc<ConnectivityMonitor>,
    status: Arc<watch::Sender<SyncStatusSnapshot>>,
}

impl OfflineInspectionService {
    pub fn new(
        store: Arc<dyn InspectionStore>,
        orchestrator: Arc<SyncOrchestrator>,
        monitor: Arc<ConnectivityMonitor>,
    ) -> Self {
        Self::build(
            Ok(Persistence {
                store,
                orchestrator,
            }),
            monitor,
        )
    }

    pub fn without_persistence(monitor: Arc<ConnectivityMonitor>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::warn!(target: LOG_TARGET, reason = %reason, "offline persistence disabled");
        Self::build(Err(reason), monitor)
    }

    fn build(persistence: Result<Persistence, String>, monitor: Arc<ConnectivityMonitor>) -> Self {
        let (status, _) = watch::channel(SyncStatusSnapshot {
            persistence_enabled: persistence.is_ok(),
            ..SyncStatusSnapshot::default()
        });
        Self {
            persistence,
            monitor,
            status: Arc::new(status),
        }
    }

    fn persistence(&self) -> Result<&Persistence, AppError> {
        self.persistence
            .as_ref()
            .map_err(|reason| AppError::storage_unavailable(reason.clone()))
    }

    fn store(&self) -> Result<&Arc<dyn InspectionStore>, AppError> {
        Ok(&self.persistence()?.store)
    }

    pub fn persistence_enabled(&self) -> bool {
        self.persistence.is_ok()
    }

    pub fn connectivity(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    pub fn is_offline(&self) -> bool {
        self.monitor.is_offline()
    }

    pub fn is_syncing(&self) -> bool {
        self.persistence
            .as_ref()
            .map(|p| p.orchestrator.is_syncing())
            .unwrap_or(false)
    }

    pub fn status(&self) -> SyncStatusSnapshot {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatusSnapshot> {
        self.status.subscribe()
    }

    /// Counts for pending badges.
    pub async fn pending_counts(&self) -> Result<StoreStats, AppError> {
        self.store()?.get_stats().await
    }

    pub async fn save_draft(&self, draft: &InspectionDraft) -> Result<InspectionDraft, AppError> {
        self.store()?.save_draft(draft).await
    }

    pub async fn save_item(&self, item: &InspectionItem) -> Result<InspectionItem, AppError> {
        self.store()?.save_item(item).await
    }

    pub async fn save_photo(&self, photo: &InspectionPhoto) -> Result<InspectionPhoto, AppError> {
        self.store()?.save_photo(photo).await
    }

    pub async fn unsynced_drafts(&self) -> Result<Vec<InspectionDraft>, AppError> {
        self.store()?.get_unsynced_drafts().await
    }

    pub async fn enqueue_action(
        &self,
        draft: &SyncQueueEntryDraft,
    ) -> Result<SyncQueueEntry, AppError> {
        self.store()?.enqueue_sync_entry(draft).await
    }

    /// Runs a sync pass now. `Ok(None)` means nothing ran: the device is offline, persistence
    /// is disabled, or another pass is already active.
    pub async fn trigger_sync(&self) -> Result<Option<SyncReport>, AppError> {
        let orchestrator = match &self.persistence {
            Ok(persistence) => persistence.orchestrator.clone(),
            Err(_) => {
                tracing::debug!(target: LOG_TARGET, "sync skipped: persistence disabled");
                return Ok(None);
            }
        };
        if self.is_offline() {
            tracing::debug!(target: LOG_TARGET, "sync skipped: offline");
            return Ok(None);
        }

        let status = Arc::clone(&self.status);
        let on_progress: ProgressCallback = Arc::new(move |progress: SyncProgress| {
            status.send_modify(|snapshot| {
                snapshot.is_syncing = true;
                snapshot.progress = Some(progress);
            });
        });

        match orchestrator.run(Some(on_progress)).await {
            Ok(report) => {
                self.status.send_modify(|snapshot| {
                    snapshot.is_syncing = false;
                    snapshot.last_report = Some(report.clone());
                    snapshot.last_synced_at = Some(Utc::now());
                });
                Ok(Some(report))
            }
            Err(AppError::SyncInProgress) => {
                tracing::debug!(target: LOG_TARGET, "sync skipped: pass already running");
                Ok(None)
            }
            Err(err) => {
                self.status.send_modify(|snapshot| snapshot.is_syncing = false);
                Err(err)
            }
        }
    }

    /// Wipes every local collection. Refused while a pass is running.
    pub async fn clear_local(&self) -> Result<(), AppError> {
        let persistence = self.persistence()?;
        if persistence.orchestrator.is_syncing() {
            return Err(AppError::SyncInProgress);
        }
        persistence.store.clear_all().await?;
        self.status.send_modify(|snapshot| {
            snapshot.progress = None;
            snapshot.last_report = None;
        });
        Ok(())
    }

    pub fn metrics(&self) -> SyncMetricsSnapshot {
        self.persistence
            .as_ref()
            .map(|p| p.orchestrator.metrics().snapshot())
            .unwrap_or_default()
    }

    /// Syncs automatically whenever connectivity comes back.
    pub fn enable_auto_sync(self: &Arc<Self>) {
        self.monitor.set_callback(Arc::new(AutoSyncTrigger {
            service: Arc::downgrade(self),
        }));
    }

    pub fn disable_auto_sync(&self) {
        self.monitor.clear_callback();
    }

    /// Triggers a pass every `interval` until the service is dropped.
    pub fn spawn_periodic_sync(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let service = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(service) = service.upgrade() else {
                    break;
                };
                if let Err(err) = service.trigger_sync().await {
                    tracing::error!(target: LOG_TARGET, error = %err, "periodic sync failed");
                }
            }
        })
    }
}

struct AutoSyncTrigger {
    service: Weak<OfflineInspectionService>,
}

#[async_trait]
impl OnlineCallback for AutoSyncTrigger {
    async fn on_online(&self) {
        let Some(service) = self.service.upgrade() else {
            return;
        };
        match service.trigger_sync().await {
            Ok(Some(report)) => tracing::info!(
                target: LOG_TARGET,
                synced = report.synced,
                failed = report.failed,
                "auto sync finished"
            ),
            Ok(None) => {}
            Err(err) => tracing::error!(target: LOG_TARGET, error = %err, "auto sync failed"),
        }
    }
}
