//! Local-first synchronization engine for offline property inspections.
//!
//! Inspectors write drafts, items and photos to a local SQLite store without any network
//! dependency. A [`application::services::SyncOrchestrator`] later pushes that state to the
//! remote system of record in dependency order, triggered by connectivity changes, a timer or
//! an explicit call.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::services::{
    ConnectivityEvent, ConnectivityMonitor, OfflineInspectionService, SyncOrchestrator,
    SyncStatusSnapshot,
};
pub use shared::{AppConfig, AppError, RemoteError, Result};
pub use state::AppState;

/// Installs the global `tracing` subscriber. Calling it again is a no-op.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inspection=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
