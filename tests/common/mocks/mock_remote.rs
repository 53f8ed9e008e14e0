use async_trait::async_trait;
use inspection_sync::application::ports::offline_store::InspectionStore;
use inspection_sync::application::ports::remote_api::{
    CreateInspectionRequest, CreateItemRequest, InspectionRemote, PhotoUpload,
    SignatureSubmission,
};
use inspection_sync::domain::value_objects::offline::{LocalId, ServerId};
use inspection_sync::RemoteError;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    CreateInspection { client_id: String },
    UpdateInspection { server_id: String, note: String },
    UploadPhoto {
        client_id: String,
        inspection_id: String,
        item_client_id: Option<String>,
    },
    CreateItem { client_id: String, photo_paths: Vec<String> },
    SubmitSignature { client_id: String },
}

/// In-memory stand-in for the system of record. Resubmitting an already created client id
/// answers with a conflict carrying the existing identifier, like the real API.
#[derive(Default)]
pub struct MockInspectionRemote {
    calls: Mutex<Vec<RemoteCall>>,
    inspections: Mutex<HashMap<String, String>>,
    notes: Mutex<HashMap<String, String>>,
    items: Mutex<HashMap<String, String>>,
    failing_properties: Mutex<HashSet<String>>,
    bare_conflict_properties: Mutex<HashSet<String>>,
    failing_photos: Mutex<HashSet<String>>,
    fail_signatures: AtomicBool,
    next_id: AtomicU32,
    latency: Mutex<Option<Duration>>,
    store: Mutex<Option<Arc<dyn InspectionStore>>>,
    draft_synced_at_item_create: Mutex<Vec<bool>>,
    note_edit_during_create: Mutex<Option<String>>,
}

impl MockInspectionRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn create_inspection_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RemoteCall::CreateInspection { .. }))
            .count()
    }

    pub fn signature_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RemoteCall::SubmitSignature { .. }))
            .count()
    }

    pub fn remote_inspections(&self) -> HashMap<String, String> {
        self.inspections.lock().unwrap().clone()
    }

    pub fn update_inspection_calls(&self) -> Vec<RemoteCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, RemoteCall::UpdateInspection { .. }))
            .collect()
    }

    /// Latest note the remote holds for the inspection created from `client_id`.
    pub fn remote_note(&self, client_id: &LocalId) -> Option<String> {
        self.notes.lock().unwrap().get(client_id.as_str()).cloned()
    }

    pub fn remote_items(&self) -> HashMap<String, String> {
        self.items.lock().unwrap().clone()
    }

    /// Pretends an earlier attempt created the inspection remotely before the device crashed.
    pub fn preexisting_inspection(&self, client_id: &LocalId, server_id: &str) {
        self.inspections
            .lock()
            .unwrap()
            .insert(client_id.to_string(), server_id.to_string());
    }

    pub fn fail_property(&self, property_id: &str) {
        self.failing_properties
            .lock()
            .unwrap()
            .insert(property_id.to_string());
    }

    pub fn recover_property(&self, property_id: &str) {
        self.failing_properties.lock().unwrap().remove(property_id);
    }

    pub fn conflict_without_id_for(&self, property_id: &str) {
        self.bare_conflict_properties
            .lock()
            .unwrap()
            .insert(property_id.to_string());
    }

    pub fn clear_conflicts(&self) {
        self.bare_conflict_properties.lock().unwrap().clear();
    }

    pub fn fail_photo(&self, photo_id: &LocalId) {
        self.failing_photos
            .lock()
            .unwrap()
            .insert(photo_id.to_string());
    }

    pub fn recover_photo(&self, photo_id: &LocalId) {
        self.failing_photos.lock().unwrap().remove(photo_id.as_str());
    }

    /// Once the next inspection is created, the user edits its note on the device while the
    /// pass is still running. Needs [`MockInspectionRemote::observe_store`].
    pub fn edit_note_during_create(&self, note: &str) {
        *self.note_edit_during_create.lock().unwrap() = Some(note.to_string());
    }

    pub fn fail_signatures(&self, fail: bool) {
        self.fail_signatures.store(fail, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Lets item creation observe whether the owning draft is already marked synced locally.
    pub fn observe_store(&self, store: Arc<dyn InspectionStore>) {
        *self.store.lock().unwrap() = Some(store);
    }

    pub fn draft_synced_at_item_create(&self) -> Vec<bool> {
        self.draft_synced_at_item_create.lock().unwrap().clone()
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn allocate(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn draft_for_inspection(&self, inspection_id: &ServerId) -> Option<String> {
        self.inspections
            .lock()
            .unwrap()
            .iter()
            .find(|(_, server_id)| server_id.as_str() == inspection_id.as_str())
            .map(|(client_id, _)| client_id.clone())
    }
}

#[async_trait]
impl InspectionRemote for MockInspectionRemote {
    async fn create_inspection(
        &self,
        request: &CreateInspectionRequest,
    ) -> Result<ServerId, RemoteError> {
        self.record(RemoteCall::CreateInspection {
            client_id: request.client_id.to_string(),
        });
        self.simulate_latency().await;

        if self
            .failing_properties
            .lock()
            .unwrap()
            .contains(&request.property_id)
        {
            return Err(RemoteError::Network("connection reset".into()));
        }
        if self
            .bare_conflict_properties
            .lock()
            .unwrap()
            .contains(&request.property_id)
        {
            return Err(RemoteError::conflict(None));
        }

        let server_id = {
            let mut inspections = self.inspections.lock().unwrap();
            if let Some(existing) = inspections.get(request.client_id.as_str()) {
                return Err(RemoteError::conflict(Some(existing.clone())));
            }
            let server_id = self.allocate("srv");
            inspections.insert(request.client_id.to_string(), server_id.clone());
            server_id
        };
        self.notes
            .lock()
            .unwrap()
            .insert(request.client_id.to_string(), request.note.clone());

        let edit = self.note_edit_during_create.lock().unwrap().take();
        let store = self.store.lock().unwrap().clone();
        if let (Some(note), Some(store)) = (edit, store) {
            let mut draft = store
                .get_draft(&request.client_id)
                .await
                .unwrap()
                .expect("draft being created");
            draft.note = note;
            draft.touch();
            store.save_draft(&draft).await.unwrap();
        }

        Ok(ServerId::new(server_id).unwrap())
    }

    async fn update_inspection(
        &self,
        server_id: &ServerId,
        request: &CreateInspectionRequest,
    ) -> Result<(), RemoteError> {
        self.record(RemoteCall::UpdateInspection {
            server_id: server_id.to_string(),
            note: request.note.clone(),
        });

        if self
            .failing_properties
            .lock()
            .unwrap()
            .contains(&request.property_id)
        {
            return Err(RemoteError::Network("connection reset".into()));
        }
        match self.draft_for_inspection(server_id) {
            Some(client_id) => {
                self.notes.lock().unwrap().insert(client_id, request.note.clone());
                Ok(())
            }
            None => Err(RemoteError::api(404, "inspection not found")),
        }
    }

    async fn upload_photo(&self, upload: &PhotoUpload) -> Result<String, RemoteError> {
        self.record(RemoteCall::UploadPhoto {
            client_id: upload.client_id.to_string(),
            inspection_id: upload.inspection_id.to_string(),
            item_client_id: upload.item_client_id.as_ref().map(LocalId::to_string),
        });

        if self
            .failing_photos
            .lock()
            .unwrap()
            .contains(upload.client_id.as_str())
        {
            return Err(RemoteError::api(503, "storage unavailable"));
        }
        Ok(format!("{}/{}", upload.inspection_id, upload.file_name))
    }

    async fn create_item(
        &self,
        request: &CreateItemRequest,
    ) -> Result<Option<ServerId>, RemoteError> {
        self.record(RemoteCall::CreateItem {
            client_id: request.client_id.to_string(),
            photo_paths: request.photo_paths.clone(),
        });

        let store = self.store.lock().unwrap().clone();
        if let Some(store) = store {
            if let Some(client_id) = self.draft_for_inspection(&request.inspection_id) {
                let local_id = LocalId::parse(&client_id).unwrap();
                let synced = store
                    .get_draft(&local_id)
                    .await
                    .ok()
                    .flatten()
                    .map(|draft| draft.synced)
                    .unwrap_or(false);
                self.draft_synced_at_item_create
                    .lock()
                    .unwrap()
                    .push(synced);
            }
        }

        let mut items = self.items.lock().unwrap();
        if let Some(existing) = items.get(request.client_id.as_str()) {
            return Err(RemoteError::conflict(Some(existing.clone())));
        }
        let server_id = self.allocate("item");
        items.insert(request.client_id.to_string(), server_id.clone());
        Ok(Some(ServerId::new(server_id).unwrap()))
    }

    async fn submit_signature(&self, submission: &SignatureSubmission) -> Result<(), RemoteError> {
        self.record(RemoteCall::SubmitSignature {
            client_id: submission.client_id.to_string(),
        });
        if self.fail_signatures.load(Ordering::SeqCst) {
            return Err(RemoteError::api(502, "bad gateway"));
        }
        Ok(())
    }
}
