use thiserror::Error;

/// Failures reported by the remote system of record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Remote conflict (existing id: {existing_id:?})")]
    Conflict { existing_id: Option<String> },

    #[error("Remote API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid remote response: {0}")]
    InvalidResponse(String),

    #[error("Invalid remote request: {0}")]
    InvalidRequest(String),
}

impl RemoteError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn conflict(existing_id: Option<String>) -> Self {
        Self::Conflict { existing_id }
    }

    /// Transport failures and transient server statuses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => matches!(*status, 408 | 429 | 500..=599),
            Self::Conflict { .. } | Self::InvalidResponse(_) | Self::InvalidRequest(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Local storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Unknown sync action: {0}")]
    UnknownAction(String),

    #[error("A sync pass is already in progress")]
    SyncInProgress,

    #[error("Remote conflict without a recoverable identifier: {0}")]
    ConflictWithoutIdentifier(String),

    #[error("Record is immutable: {0}")]
    Immutable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Remote(err) => err.is_retryable(),
            _ => false,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
