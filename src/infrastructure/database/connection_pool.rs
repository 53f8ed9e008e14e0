use crate::shared::config::DatabaseConfig;
use crate::shared::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone)]
pub struct ConnectionPool {
    pool: Arc<SqlitePool>,
}

impl ConnectionPool {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Single-connection in-memory database; the data lives as long as the pool.
    pub async fn from_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Connects and applies pending migrations. Any failure means offline persistence is
    /// unavailable for this session.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, AppError> {
        ensure_parent_dir(&config.url).await?;

        let pool = Self::new(&config.url, config.max_connections)
            .await
            .map_err(|err| AppError::storage_unavailable(format!("connect failed: {err}")))?;
        pool.migrate()
            .await
            .map_err(|err| AppError::storage_unavailable(format!("migration failed: {err}")))?;

        tracing::info!(target: "inspection::store", url = %config.url, "local store opened");
        Ok(pool)
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn ensure_parent_dir(database_url: &str) -> Result<(), AppError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|err| AppError::storage_unavailable(format!("invalid database url: {err}")))?;
    let filename = options.get_filename();
    if filename.as_os_str().is_empty() || filename.to_string_lossy().contains(":memory:") {
        return Ok(());
    }
    if let Some(parent) = filename.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                AppError::storage_unavailable(format!(
                    "cannot create {}: {err}",
                    parent.display()
                ))
            })?;
        }
    }
    Ok(())
}
