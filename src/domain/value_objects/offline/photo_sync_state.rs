use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Upload state of a captured photo. `Failed` is not terminal: it records that an upload was
/// attempted and did not succeed, so a later pass retries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSyncState {
    #[default]
    Pending,
    Uploaded,
    Failed,
}

impl PhotoSyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoSyncState::Pending => "pending",
            PhotoSyncState::Uploaded => "uploaded",
            PhotoSyncState::Failed => "failed",
        }
    }

    pub fn needs_upload(&self) -> bool {
        !matches!(self, PhotoSyncState::Uploaded)
    }
}

impl fmt::Display for PhotoSyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PhotoSyncState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PhotoSyncState::Pending),
            "uploaded" => Ok(PhotoSyncState::Uploaded),
            "failed" => Ok(PhotoSyncState::Failed),
            other => Err(format!("Unknown photo sync state: {other}")),
        }
    }
}
