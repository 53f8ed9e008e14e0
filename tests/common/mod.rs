#![allow(dead_code)]

pub mod mocks;

use inspection_sync::application::ports::offline_store::InspectionStore;
use inspection_sync::application::ports::remote_api::InspectionRemote;
use inspection_sync::application::services::{
    ActionDispatch, ConnectivityMonitor, OfflineInspectionService, SyncOrchestrator,
};
use inspection_sync::domain::entities::offline::{
    InspectionDraft, InspectionItem, InspectionPhoto, SyncQueueEntryDraft,
};
use inspection_sync::domain::value_objects::offline::{
    EntityType, InspectionKind, ItemCondition, LocalId, OfflinePayload, SyncActionType,
};
use inspection_sync::infrastructure::database::ConnectionPool;
use inspection_sync::infrastructure::offline::SqliteInspectionStore;
use mocks::MockInspectionRemote;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub struct SyncHarness {
    pub store: Arc<dyn InspectionStore>,
    pub remote: Arc<MockInspectionRemote>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

pub async fn memory_store() -> Arc<dyn InspectionStore> {
    let pool = ConnectionPool::from_memory().await.expect("in-memory sqlite");
    pool.migrate().await.expect("migrate");
    Arc::new(SqliteInspectionStore::new(pool))
}

pub async fn sync_harness() -> SyncHarness {
    sync_harness_over(memory_store().await)
}

pub fn sync_harness_over(store: Arc<dyn InspectionStore>) -> SyncHarness {
    let remote = MockInspectionRemote::new();
    let remote_port: Arc<dyn InspectionRemote> = remote.clone();
    let orchestrator = SyncOrchestrator::new(
        store.clone(),
        remote_port.clone(),
        ActionDispatch::for_remote(remote_port),
    )
    .with_retry_backoff(Duration::ZERO);

    SyncHarness {
        store,
        remote,
        orchestrator: Arc::new(orchestrator),
    }
}

impl SyncHarness {
    pub fn service(&self, monitor: Arc<ConnectivityMonitor>) -> Arc<OfflineInspectionService> {
        Arc::new(OfflineInspectionService::new(
            self.store.clone(),
            self.orchestrator.clone(),
            monitor,
        ))
    }
}

pub struct SeededDraft {
    pub draft: InspectionDraft,
    pub items: Vec<InspectionItem>,
    pub photos: Vec<InspectionPhoto>,
}

/// Saves a draft with `items` items, each illustrated by `photos_per_item` photos.
pub async fn seed_draft(
    store: &Arc<dyn InspectionStore>,
    property_id: &str,
    items: usize,
    photos_per_item: usize,
) -> SeededDraft {
    let draft = store
        .save_draft(
            &InspectionDraft::new(property_id, InspectionKind::MoveIn)
                .with_note(format!("walkthrough of {property_id}")),
        )
        .await
        .expect("save draft");

    let mut saved_items = Vec::new();
    let mut saved_photos = Vec::new();
    for index in 0..items {
        let mut item = InspectionItem::new(
            draft.local_id.clone(),
            format!("Room {index}"),
            format!("Fixture {index}"),
            ItemCondition::Good,
        );
        let mut photo_ids = Vec::new();
        for shot in 0..photos_per_item {
            let photo = InspectionPhoto::new(
                draft.local_id.clone(),
                Some(item.local_id.clone()),
                vec![index as u8, shot as u8, 0xAB],
                "image/jpeg",
                format!("item{index}-shot{shot}.jpg"),
            );
            let photo = store.save_photo(&photo).await.expect("save photo");
            photo_ids.push(photo.local_id.clone());
            saved_photos.push(photo);
        }
        item = item.with_photos(photo_ids);
        saved_items.push(store.save_item(&item).await.expect("save item"));
    }

    SeededDraft {
        draft,
        items: saved_items,
        photos: saved_photos,
    }
}

pub fn signature_entry(client_id: &LocalId) -> SyncQueueEntryDraft {
    SyncQueueEntryDraft::new(
        SyncActionType::SubmitSignature,
        EntityType::new("signature".into()).expect("entity type"),
        Some(client_id.clone()),
        OfflinePayload::new(json!({
            "clientId": client_id.as_str(),
            "inspectionId": "srv-signed",
            "signerName": "Jordan Tenant",
            "signerRole": "tenant",
            "signature": "data:image/png;base64,iVBORw0KGgo="
        }))
        .expect("payload"),
    )
}
