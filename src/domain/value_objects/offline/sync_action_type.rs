use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of deferred action stored in the generic sync queue.
///
/// Kinds written by an older or newer build are kept as `Unknown` so the queue processor can
/// fail them explicitly instead of losing them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SyncActionType {
    CreateInspection,
    CreateItem,
    UploadPhoto,
    SubmitSignature,
    Unknown(String),
}

impl SyncActionType {
    pub fn as_str(&self) -> &str {
        match self {
            SyncActionType::CreateInspection => "create_inspection",
            SyncActionType::CreateItem => "create_item",
            SyncActionType::UploadPhoto => "upload_photo",
            SyncActionType::SubmitSignature => "submit_signature",
            SyncActionType::Unknown(value) => value.as_str(),
        }
    }
}

impl fmt::Display for SyncActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for SyncActionType {
    fn from(value: &str) -> Self {
        match value {
            "create_inspection" => SyncActionType::CreateInspection,
            "create_item" => SyncActionType::CreateItem,
            "upload_photo" => SyncActionType::UploadPhoto,
            "submit_signature" => SyncActionType::SubmitSignature,
            other => SyncActionType::Unknown(other.to_string()),
        }
    }
}

impl From<String> for SyncActionType {
    fn from(value: String) -> Self {
        SyncActionType::from(value.as_str())
    }
}

impl From<SyncActionType> for String {
    fn from(value: SyncActionType) -> Self {
        value.as_str().to_string()
    }
}
