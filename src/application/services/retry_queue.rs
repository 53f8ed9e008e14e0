use crate::application::ports::offline_store::InspectionStore;
use crate::application::ports::remote_api::{
    CreateInspectionRequest, CreateItemRequest, InspectionRemote, PhotoUpload,
    SignatureSubmission,
};
use crate::domain::entities::offline::SyncQueueEntry;
use crate::domain::value_objects::offline::{SyncActionType, SyncQueueId, SyncQueueStatus};
use crate::shared::error::{AppError, RemoteError};
use async_trait::async_trait;
use rand::Rng;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

const LOG_TARGET: &str = "inspection::queue";

/// Attempts per queue entry across passes, and per remote call within a pass.
pub const MAX_RETRIES: u32 = 3;

const MAX_BACKOFF_MS: u64 = 8_000;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send>>;

/// Executes one kind of queued action. Called once per attempt.
#[async_trait]
pub trait SyncActionHandler: Send + Sync {
    async fn execute(&self, entry: &SyncQueueEntry) -> Result<(), AppError>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F> SyncActionHandler for FnHandler<F>
where
    F: Fn(SyncQueueEntry) -> HandlerFuture + Send + Sync,
{
    async fn execute(&self, entry: &SyncQueueEntry) -> Result<(), AppError> {
        (self.0)(entry.clone()).await
    }
}

/// Maps an action kind to the handler that executes it.
#[derive(Clone, Default)]
pub struct ActionDispatch {
    handlers: HashMap<SyncActionType, Arc<dyn SyncActionHandler>>,
}

impl ActionDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every known action kind against the remote port.
    pub fn for_remote(remote: Arc<dyn InspectionRemote>) -> Self {
        let mut dispatch = Self::new();
        for kind in [
            SyncActionType::CreateInspection,
            SyncActionType::CreateItem,
            SyncActionType::UploadPhoto,
            SyncActionType::SubmitSignature,
        ] {
            let handler = RemoteActionHandler::new(kind.clone(), remote.clone());
            dispatch.register(kind, Arc::new(handler));
        }
        dispatch
    }

    pub fn register(&mut self, kind: SyncActionType, handler: Arc<dyn SyncActionHandler>) {
        self.handlers.insert(kind, handler);
    }

    pub fn register_fn<F>(&mut self, kind: SyncActionType, handler: F)
    where
        F: Fn(SyncQueueEntry) -> HandlerFuture + Send + Sync + 'static,
    {
        self.register(kind, Arc::new(FnHandler(handler)));
    }

    pub fn handler(&self, kind: &SyncActionType) -> Option<Arc<dyn SyncActionHandler>> {
        self.handlers.get(kind).cloned()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &SyncActionType> {
        self.handlers.keys()
    }
}

/// Replays a queued payload against the remote API. A conflict means the resource already
/// exists remotely, so it counts as success.
pub struct RemoteActionHandler {
    kind: SyncActionType,
    remote: Arc<dyn InspectionRemote>,
}

impl RemoteActionHandler {
    pub fn new(kind: SyncActionType, remote: Arc<dyn InspectionRemote>) -> Self {
        Self { kind, remote }
    }

    fn payload<T: DeserializeOwned>(entry: &SyncQueueEntry) -> Result<T, AppError> {
        serde_json::from_value(entry.payload.as_json().clone()).map_err(|err| {
            AppError::DeserializationError(format!(
                "{} payload of entry {}: {err}",
                entry.action_type, entry.id
            ))
        })
    }
}

#[async_trait]
impl SyncActionHandler for RemoteActionHandler {
    async fn execute(&self, entry: &SyncQueueEntry) -> Result<(), AppError> {
        let result = match &self.kind {
            SyncActionType::CreateInspection => {
                let request: CreateInspectionRequest = Self::payload(entry)?;
                self.remote.create_inspection(&request).await.map(|_| ())
            }
            SyncActionType::CreateItem => {
                let request: CreateItemRequest = Self::payload(entry)?;
                self.remote.create_item(&request).await.map(|_| ())
            }
            SyncActionType::UploadPhoto => {
                let upload: PhotoUpload = Self::payload(entry)?;
                self.remote.upload_photo(&upload).await.map(|_| ())
            }
            SyncActionType::SubmitSignature => {
                let submission: SignatureSubmission = Self::payload(entry)?;
                self.remote.submit_signature(&submission).await
            }
            SyncActionType::Unknown(kind) => return Err(AppError::UnknownAction(kind.clone())),
        };

        match result {
            Ok(()) | Err(RemoteError::Conflict { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOutcome {
    Completed,
    /// Failed this attempt, back to `pending` for a later pass.
    RetryScheduled,
    /// Terminal failure.
    Failed,
    /// The entry could not be read or written back; left as stored.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedEntry {
    pub id: SyncQueueId,
    pub action_type: SyncActionType,
    pub outcome: QueueOutcome,
    pub error: Option<String>,
}

pub struct RetryQueueProcessor {
    store: Arc<dyn InspectionStore>,
    dispatch: ActionDispatch,
}

impl RetryQueueProcessor {
    pub fn new(store: Arc<dyn InspectionStore>, dispatch: ActionDispatch) -> Self {
        Self { store, dispatch }
    }

    pub fn dispatch(&self) -> &ActionDispatch {
        &self.dispatch
    }

    /// Runs one attempt of `entry` and persists the resulting status.
    pub async fn process(&self, mut entry: SyncQueueEntry) -> Result<ProcessedEntry, AppError> {
        if entry.is_terminal() {
            let outcome = match entry.status {
                SyncQueueStatus::Completed => QueueOutcome::Completed,
                _ => QueueOutcome::Failed,
            };
            return Ok(ProcessedEntry {
                id: entry.id,
                action_type: entry.action_type.clone(),
                outcome,
                error: None,
            });
        }

        let Some(handler) = self.dispatch.handler(&entry.action_type) else {
            let error = AppError::UnknownAction(entry.action_type.to_string()).to_string();
            tracing::error!(
                target: LOG_TARGET,
                id = %entry.id,
                action = %entry.action_type,
                "no handler registered; failing entry"
            );
            entry.mark_unhandled(error.clone());
            self.store.update_sync_entry(&entry).await?;
            return Ok(ProcessedEntry {
                id: entry.id,
                action_type: entry.action_type,
                outcome: QueueOutcome::Failed,
                error: Some(error),
            });
        };

        entry.mark_processing();
        self.store.update_sync_entry(&entry).await?;

        let (outcome, error) = match handler.execute(&entry).await {
            Ok(()) => {
                entry.mark_completed();
                tracing::debug!(target: LOG_TARGET, id = %entry.id, action = %entry.action_type, "entry completed");
                (QueueOutcome::Completed, None)
            }
            Err(err) => {
                let message = err.to_string();
                let outcome = match entry.record_failure(message.clone(), MAX_RETRIES) {
                    SyncQueueStatus::Failed => QueueOutcome::Failed,
                    _ => QueueOutcome::RetryScheduled,
                };
                tracing::warn!(
                    target: LOG_TARGET,
                    id = %entry.id,
                    action = %entry.action_type,
                    attempt = entry.retry_count,
                    error = %message,
                    "entry attempt failed"
                );
                (outcome, Some(message))
            }
        };

        self.store.update_sync_entry(&entry).await?;
        Ok(ProcessedEntry {
            id: entry.id,
            action_type: entry.action_type,
            outcome,
            error,
        })
    }

    /// One attempt for every pending entry, in FIFO order.
    pub async fn drain(&self) -> Result<Vec<ProcessedEntry>, AppError> {
        let entries = self.store.get_pending_sync_entries().await?;
        let mut processed = Vec::with_capacity(entries.len());

        for entry in entries {
            let id = entry.id;
            let action_type = entry.action_type.clone();
            match self.process(entry).await {
                Ok(result) => processed.push(result),
                Err(err) => {
                    tracing::error!(target: LOG_TARGET, id = %id, error = %err, "queue entry skipped");
                    processed.push(ProcessedEntry {
                        id,
                        action_type,
                        outcome: QueueOutcome::Skipped,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        Ok(processed)
    }
}

/// Runs `op` up to [`MAX_RETRIES`] times while it fails with a retryable error, sleeping an
/// exponentially growing, jittered delay derived from `base` between attempts.
pub async fn retry_remote<T, F, Fut>(base: Duration, mut op: F) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < MAX_RETRIES => {
                let delay = backoff_with_jitter(base, attempt);
                tracing::debug!(
                    target: LOG_TARGET,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retrying remote call"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn backoff_with_jitter(base: Duration, attempt: u32) -> Duration {
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(MAX_BACKOFF_MS);
    if base_ms == 0 {
        return Duration::ZERO;
    }
    let exp = attempt.saturating_sub(1).min(8);
    let backoff = base_ms.saturating_mul(1_u64 << exp).min(MAX_BACKOFF_MS);
    let jitter = rand::thread_rng().gen_range(0..=(backoff / 5).max(1));
    Duration::from_millis(backoff.saturating_add(jitter))
}
