use super::retry_queue::{retry_remote, ActionDispatch, QueueOutcome, RetryQueueProcessor};
use crate::application::ports::offline_store::InspectionStore;
use crate::application::ports::remote_api::{
    CreateInspectionRequest, CreateItemRequest, InspectionRemote, PhotoUpload,
};
use crate::domain::entities::offline::{
    EntityRef, InspectionDraft, InspectionItem, InspectionPhoto, SyncProgress, SyncReport,
};
use crate::domain::value_objects::offline::{LocalId, ServerId};
use crate::shared::error::{AppError, RemoteError};
use crate::shared::metrics::SyncMetrics;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const LOG_TARGET: &str = "inspection::sync";
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);

pub type ProgressCallback = Arc<dyn Fn(SyncProgress) + Send + Sync>;

/// Releases the single-pass flag when the pass ends, including on early return.
struct PassGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Pushes offline-authored drafts, photos and items to the remote system of record, then drains
/// the generic retry queue.
///
/// At most one pass runs per instance; a concurrent [`SyncOrchestrator::run`] fails fast with
/// [`AppError::SyncInProgress`].
pub struct SyncOrchestrator {
    store: Arc<dyn InspectionStore>,
    remote: Arc<dyn InspectionRemote>,
    queue: RetryQueueProcessor,
    metrics: Arc<SyncMetrics>,
    retry_backoff: Duration,
    syncing: AtomicBool,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<dyn InspectionStore>,
        remote: Arc<dyn InspectionRemote>,
        dispatch: ActionDispatch,
    ) -> Self {
        Self {
            queue: RetryQueueProcessor::new(store.clone(), dispatch),
            store,
            remote,
            metrics: Arc::new(SyncMetrics::default()),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            syncing: AtomicBool::new(false),
        }
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn metrics(&self) -> Arc<SyncMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<PassGuard<'_>> {
        self.syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard {
                flag: &self.syncing,
            })
    }

    /// Runs one full pass. Per-entity failures are reported in the returned [`SyncReport`];
    /// only a concurrent pass or an unreadable store is an error.
    pub async fn run(&self, progress: Option<ProgressCallback>) -> Result<SyncReport, AppError> {
        let _guard = self.try_begin().ok_or(AppError::SyncInProgress)?;
        let started = Instant::now();

        let result = self.run_pass(progress).await;
        match &result {
            Ok(report) => {
                self.metrics.passes.record(!report.has_errors());
                tracing::info!(
                    target: LOG_TARGET,
                    synced = report.synced,
                    failed = report.failed,
                    items_synced = report.items_synced,
                    photos_uploaded = report.photos_uploaded,
                    errors = report.errors.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "sync pass finished"
                );
            }
            Err(err) => {
                self.metrics.passes.record_failure();
                tracing::error!(target: LOG_TARGET, error = %err, "sync pass aborted");
            }
        }
        result
    }

    async fn run_pass(&self, progress: Option<ProgressCallback>) -> Result<SyncReport, AppError> {
        let drafts = self.store.get_unsynced_drafts().await?;
        let followups = self.store.get_drafts_with_pending_children().await?;

        let mut report = SyncReport::default();
        let mut state = SyncProgress {
            total: u32::try_from(drafts.len() + followups.len()).unwrap_or(u32::MAX),
            ..SyncProgress::default()
        };
        tracing::info!(
            target: LOG_TARGET,
            drafts = drafts.len(),
            followups = followups.len(),
            "sync pass started"
        );
        notify(&progress, &state);

        for draft in &drafts {
            state.current = Some(draft.describe());
            notify(&progress, &state);

            let synced = self.sync_draft(draft, &mut report).await;
            self.metrics.drafts.record(synced);
            if synced {
                report.synced += 1;
                state.completed += 1;
            } else {
                report.failed += 1;
                state.failed += 1;
            }
            notify(&progress, &state);
        }

        for draft in &followups {
            state.current = Some(draft.describe());
            notify(&progress, &state);

            match &draft.server_id {
                Some(server_id) => {
                    if let Err(err) = self.sync_children(draft, server_id, &mut report).await {
                        report.record_error(EntityRef::Draft(draft.local_id.clone()), err.to_string());
                    }
                }
                None => report.record_error(
                    EntityRef::Draft(draft.local_id.clone()),
                    "synced draft has no server id",
                ),
            }
            state.completed += 1;
            notify(&progress, &state);
        }

        state.current = None;
        if let Err(err) = self.drain_queue(&mut report).await {
            tracing::error!(target: LOG_TARGET, error = %err, "sync queue not drained");
            report.record_error(EntityRef::SyncQueue, err.to_string());
        }
        notify(&progress, &state);

        Ok(report)
    }

    /// Returns whether the draft ended up marked synced.
    async fn sync_draft(&self, draft: &InspectionDraft, report: &mut SyncReport) -> bool {
        let entity = EntityRef::Draft(draft.local_id.clone());

        let server_id = match &draft.server_id {
            Some(server_id) => match self.update_remote_draft(draft, server_id).await {
                Ok(()) => server_id.clone(),
                Err(err) => {
                    tracing::warn!(target: LOG_TARGET, local_id = %draft.local_id, error = %err, "draft update failed");
                    report.record_error(entity, err.to_string());
                    return false;
                }
            },
            None => match self.create_remote_draft(draft).await {
                Ok(server_id) => server_id,
                Err(err) => {
                    tracing::warn!(target: LOG_TARGET, local_id = %draft.local_id, error = %err, "draft creation failed");
                    report.record_error(entity, err.to_string());
                    return false;
                }
            },
        };

        if let Err(err) = self.sync_children(draft, &server_id, report).await {
            tracing::warn!(target: LOG_TARGET, local_id = %draft.local_id, error = %err, "items not processed");
            report.record_error(entity, err.to_string());
            return false;
        }

        match self
            .store
            .mark_draft_synced(&draft.local_id, &server_id, draft.revision)
            .await
        {
            Ok(true) => true,
            Ok(false) => {
                tracing::info!(
                    target: LOG_TARGET,
                    local_id = %draft.local_id,
                    "draft edited during the pass; the edit goes out on the next pass"
                );
                report.record_error(entity, "draft changed while syncing; it will be resent");
                false
            }
            Err(err) => {
                report.record_error(entity, err.to_string());
                false
            }
        }
    }

    /// The draft already exists remotely (a crash after backfill, or an edit during an earlier
    /// pass), so its current fields are sent again.
    async fn update_remote_draft(
        &self,
        draft: &InspectionDraft,
        server_id: &ServerId,
    ) -> Result<(), AppError> {
        let request = inspection_request(draft);
        tracing::debug!(
            target: LOG_TARGET,
            local_id = %draft.local_id,
            server_id = %server_id,
            "updating existing remote inspection"
        );
        retry_remote(self.retry_backoff, || {
            self.remote.update_inspection(server_id, &request)
        })
        .await?;
        Ok(())
    }

    async fn create_remote_draft(&self, draft: &InspectionDraft) -> Result<ServerId, AppError> {
        let request = inspection_request(draft);

        let server_id =
            match retry_remote(self.retry_backoff, || self.remote.create_inspection(&request)).await
            {
                Ok(server_id) => server_id,
                Err(RemoteError::Conflict {
                    existing_id: Some(existing),
                }) => {
                    tracing::info!(
                        target: LOG_TARGET,
                        local_id = %draft.local_id,
                        server_id = %existing,
                        "adopting existing remote inspection"
                    );
                    ServerId::new(existing)
                        .map_err(|err| AppError::from(RemoteError::InvalidResponse(err)))?
                }
                Err(RemoteError::Conflict { existing_id: None }) => {
                    let reason = "remote reported a conflict without the existing identifier";
                    self.store.mark_draft_blocked(&draft.local_id, reason).await?;
                    return Err(AppError::ConflictWithoutIdentifier(draft.local_id.to_string()));
                }
                Err(err) => return Err(err.into()),
            };

        self.store
            .attach_draft_server_id(&draft.local_id, &server_id)
            .await?;
        Ok(server_id)
    }

    /// Pushes unsynced items (each with its photos), then any photo still not uploaded, such as
    /// one that failed in an earlier pass after its item was created.
    async fn sync_children(
        &self,
        draft: &InspectionDraft,
        server_id: &ServerId,
        report: &mut SyncReport,
    ) -> Result<(), AppError> {
        let mut attempted = HashSet::new();
        self.sync_items(draft, server_id, &mut attempted, report).await?;

        let photos = self.store.get_photos_by_draft(&draft.local_id).await?;
        for photo in photos
            .iter()
            .filter(|photo| !photo.is_synced() && !attempted.contains(&photo.local_id))
        {
            self.ensure_photo_uploaded(photo, server_id, report).await?;
        }
        Ok(())
    }

    /// Attempts every unsynced item of the draft. Item failures are recorded and do not
    /// stop the remaining items; only failing to list the items is an error.
    async fn sync_items(
        &self,
        draft: &InspectionDraft,
        server_id: &ServerId,
        attempted: &mut HashSet<LocalId>,
        report: &mut SyncReport,
    ) -> Result<(), AppError> {
        let items = self.store.get_items_by_draft(&draft.local_id).await?;

        for item in items.iter().filter(|item| !item.synced) {
            match self.sync_item(item, server_id, attempted, report).await {
                Ok(()) => {
                    report.items_synced += 1;
                    self.metrics.items.record_success();
                }
                Err(err) => {
                    tracing::warn!(target: LOG_TARGET, local_id = %item.local_id, error = %err, "item sync failed");
                    report.items_failed += 1;
                    report.record_error(EntityRef::Item(item.local_id.clone()), err.to_string());
                    self.metrics.items.record_failure();
                }
            }
        }
        Ok(())
    }

    async fn sync_item(
        &self,
        item: &InspectionItem,
        server_id: &ServerId,
        attempted: &mut HashSet<LocalId>,
        report: &mut SyncReport,
    ) -> Result<(), AppError> {
        let mut photo_paths = Vec::with_capacity(item.photo_ids.len());
        for photo_id in &item.photo_ids {
            attempted.insert(photo_id.clone());
            let photo = self.store.get_photo(photo_id).await?.ok_or_else(|| {
                AppError::NotFound(format!(
                    "photo {photo_id} referenced by item {}",
                    item.local_id
                ))
            })?;
            if let Some(path) = self.ensure_photo_uploaded(&photo, server_id, report).await? {
                photo_paths.push(path);
            }
        }

        let request = CreateItemRequest {
            client_id: item.local_id.clone(),
            inspection_id: server_id.clone(),
            room: item.room.clone(),
            label: item.label.clone(),
            condition: item.condition,
            note: item.note.clone(),
            photo_paths,
        };

        let item_server_id =
            match retry_remote(self.retry_backoff, || self.remote.create_item(&request)).await {
                Ok(id) => id,
                Err(RemoteError::Conflict { existing_id }) => {
                    tracing::info!(target: LOG_TARGET, local_id = %item.local_id, "item already exists remotely");
                    existing_id.and_then(|id| ServerId::new(id).ok())
                }
                Err(err) => return Err(err.into()),
            };

        self.store
            .mark_item_synced(&item.local_id, item_server_id.as_ref())
            .await
    }

    /// Returns the storage path when the photo is (or already was) uploaded.
    async fn ensure_photo_uploaded(
        &self,
        photo: &InspectionPhoto,
        server_id: &ServerId,
        report: &mut SyncReport,
    ) -> Result<Option<String>, AppError> {
        if photo.is_synced() {
            return Ok(photo.server_path.clone());
        }

        let upload = PhotoUpload {
            client_id: photo.local_id.clone(),
            inspection_id: server_id.clone(),
            item_client_id: photo.item_local_id.clone(),
            file_name: photo.file_name.clone(),
            mime_type: photo.mime_type.clone(),
            data: photo.payload.clone(),
        };

        match retry_remote(self.retry_backoff, || self.remote.upload_photo(&upload)).await {
            Ok(path) => {
                self.store.mark_photo_uploaded(&photo.local_id, &path).await?;
                report.photos_uploaded += 1;
                self.metrics.photos.record_success();
                Ok(Some(path))
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(target: LOG_TARGET, local_id = %photo.local_id, error = %message, "photo upload failed");
                self.store
                    .mark_photo_failed(&photo.local_id, &message)
                    .await?;
                report.photos_failed += 1;
                report.record_error(EntityRef::Photo(photo.local_id.clone()), message);
                self.metrics.photos.record_failure();
                Ok(None)
            }
        }
    }

    async fn drain_queue(&self, report: &mut SyncReport) -> Result<(), AppError> {
        for processed in self.queue.drain().await? {
            let completed = processed.outcome == QueueOutcome::Completed;
            self.metrics.queue_entries.record(completed);
            match processed.outcome {
                QueueOutcome::Completed => {
                    report.synced += 1;
                    report.queue_completed += 1;
                }
                QueueOutcome::RetryScheduled | QueueOutcome::Skipped => {
                    report.failed += 1;
                    report.queue_retrying += 1;
                }
                QueueOutcome::Failed => {
                    report.failed += 1;
                    report.queue_failed += 1;
                }
            }
            if let Some(error) = processed.error {
                report.record_error(EntityRef::QueueEntry(processed.id), error);
            }
        }
        Ok(())
    }
}

fn inspection_request(draft: &InspectionDraft) -> CreateInspectionRequest {
    CreateInspectionRequest {
        client_id: draft.local_id.clone(),
        property_id: draft.property_id.clone(),
        lease_id: draft.lease_id.clone(),
        kind: draft.kind,
        note: draft.note.clone(),
    }
}

fn notify(progress: &Option<ProgressCallback>, state: &SyncProgress) {
    if let Some(callback) = progress {
        callback(state.clone());
    }
}
