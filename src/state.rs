use crate::application::ports::offline_store::InspectionStore;
use crate::application::ports::remote_api::InspectionRemote;
use crate::application::services::{
    ActionDispatch, ConnectivityMonitor, OfflineInspectionService, SyncOrchestrator,
};
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::offline::SqliteInspectionStore;
use crate::infrastructure::remote::HttpInspectionRemote;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

const LOG_TARGET: &str = "inspection::state";

/// Everything the host application holds on to for the lifetime of a session.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub service: Arc<OfflineInspectionService>,
    pool: Option<ConnectionPool>,
    periodic_sync: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AppState {
    /// Wires the engine with no platform connectivity signal (assumed online).
    pub async fn initialize(config: AppConfig) -> Result<Self, AppError> {
        Self::initialize_with_connectivity(config, None).await
    }

    pub async fn initialize_with_connectivity(
        config: AppConfig,
        online: Option<bool>,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let connectivity = Arc::new(ConnectivityMonitor::new(online));
        let remote: Arc<dyn InspectionRemote> = Arc::new(HttpInspectionRemote::new(&config.remote)?);

        let (service, pool) = match ConnectionPool::open(&config.database).await {
            Ok(pool) => {
                let store: Arc<dyn InspectionStore> =
                    Arc::new(SqliteInspectionStore::new(pool.clone()));
                let orchestrator = SyncOrchestrator::new(
                    store.clone(),
                    remote.clone(),
                    ActionDispatch::for_remote(remote),
                )
                .with_retry_backoff(config.sync.retry_backoff());
                let service = OfflineInspectionService::new(
                    store,
                    Arc::new(orchestrator),
                    connectivity.clone(),
                );
                (service, Some(pool))
            }
            Err(err) => {
                tracing::error!(target: LOG_TARGET, error = %err, "local store unavailable");
                (
                    OfflineInspectionService::without_persistence(
                        connectivity.clone(),
                        err.to_string(),
                    ),
                    None,
                )
            }
        };
        let service = Arc::new(service);

        if config.sync.auto_sync {
            service.enable_auto_sync();
        }
        let periodic_sync = config
            .sync
            .sync_interval()
            .map(|interval| service.spawn_periodic_sync(interval));

        tracing::info!(
            target: LOG_TARGET,
            persistence = service.persistence_enabled(),
            auto_sync = config.sync.auto_sync,
            "inspection sync initialized"
        );

        Ok(Self {
            config,
            connectivity,
            service,
            pool,
            periodic_sync: Arc::new(Mutex::new(periodic_sync)),
        })
    }

    /// Stops background work and closes the local store.
    pub async fn shutdown(&self) {
        let handle = match self.periodic_sync.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
        }
        self.service.disable_auto_sync();
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
        tracing::info!(target: LOG_TARGET, "inspection sync shut down");
    }
}
