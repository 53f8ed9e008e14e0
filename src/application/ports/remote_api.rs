use crate::domain::value_objects::offline::{
    InspectionKind, ItemCondition, LocalId, ServerId,
};
use crate::shared::error::RemoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of both the create and the update call of an inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInspectionRequest {
    pub client_id: LocalId,
    pub property_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_id: Option<String>,
    pub kind: InspectionKind,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpload {
    pub client_id: LocalId,
    pub inspection_id: ServerId,
    /// Local id of the item the photo illustrates, which is also that item's idempotency key
    /// remotely. Lets a late upload attach to an item created in an earlier pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_client_id: Option<LocalId>,
    pub file_name: String,
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub client_id: LocalId,
    pub inspection_id: ServerId,
    pub room: String,
    pub label: String,
    pub condition: ItemCondition,
    pub note: String,
    pub photo_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureSubmission {
    pub client_id: LocalId,
    pub inspection_id: ServerId,
    pub signer_name: String,
    pub signer_role: String,
    /// PNG or SVG data URL captured by the signature pad.
    pub signature: String,
}

/// Client side of the remote system of record.
///
/// Creation calls carry the local id as an idempotency key. A resource that already exists is
/// reported as [`RemoteError::Conflict`], ideally with the existing identifier.
#[async_trait]
pub trait InspectionRemote: Send + Sync {
    async fn create_inspection(
        &self,
        request: &CreateInspectionRequest,
    ) -> Result<ServerId, RemoteError>;

    /// Overwrites the user-authored fields of an inspection that already exists remotely.
    async fn update_inspection(
        &self,
        server_id: &ServerId,
        request: &CreateInspectionRequest,
    ) -> Result<(), RemoteError>;

    /// Returns the storage path of the uploaded asset.
    async fn upload_photo(&self, upload: &PhotoUpload) -> Result<String, RemoteError>;

    async fn create_item(
        &self,
        request: &CreateItemRequest,
    ) -> Result<Option<ServerId>, RemoteError>;

    async fn submit_signature(&self, submission: &SignatureSubmission) -> Result<(), RemoteError>;
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
