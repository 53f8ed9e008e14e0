use inspection_sync::domain::entities::offline::{InspectionDraft, InspectionItem, InspectionPhoto};
use inspection_sync::domain::value_objects::offline::{InspectionKind, ItemCondition};
use inspection_sync::{AppConfig, AppError, AppState};
use serde_json::json;
use std::path::Path;
use tempfile::{tempdir, NamedTempFile};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(db_path: &Path, remote_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = format!("sqlite:{}", db_path.display());
    config.database.max_connections = 2;
    config.remote.base_url = remote_url.to_string();
    config.remote.timeout_secs = 5;
    config.sync.auto_sync = false;
    config.sync.sync_interval_secs = 0;
    config.sync.retry_backoff_ms = 0;
    config
}

#[tokio::test]
async fn drafts_survive_a_restart() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("nested").join("inspections.db");
    let config = config_for(&db_path, "http://127.0.0.1:9");

    let state = AppState::initialize_with_connectivity(config.clone(), Some(false))
        .await
        .expect("initialize");
    assert!(state.service.persistence_enabled());
    let draft = InspectionDraft::new("prop-durable", InspectionKind::MoveIn)
        .with_lease("lease-7")
        .with_note("meter reading 10432");
    state.service.save_draft(&draft).await.expect("save");
    state.shutdown().await;

    let reopened = AppState::initialize_with_connectivity(config, Some(false))
        .await
        .expect("reinitialize");
    let drafts = reopened.service.unsynced_drafts().await.expect("list");
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].local_id, draft.local_id);
    assert_eq!(drafts[0].note, "meter reading 10432");
    assert_eq!(drafts[0].lease_id.as_deref(), Some("lease-7"));
    reopened.shutdown().await;
}

#[tokio::test]
async fn unusable_store_disables_persistence_only() {
    let blocker = NamedTempFile::new().expect("temp file");
    let db_path = blocker.path().join("inspections.db");
    let state = AppState::initialize(config_for(&db_path, "http://127.0.0.1:9"))
        .await
        .expect("initialize without store");

    assert!(!state.service.persistence_enabled());
    assert!(state.service.connectivity().is_online());
    let err = state
        .service
        .save_draft(&InspectionDraft::new("prop-x", InspectionKind::MoveOut))
        .await
        .expect_err("persistence disabled");
    assert!(matches!(err, AppError::StorageUnavailable(_)));
    state.shutdown().await;
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let mut config = config_for(&dir.path().join("db.sqlite"), "http://127.0.0.1:9");
    config.database.max_connections = 0;

    let result = AppState::initialize(config).await;
    assert!(matches!(result, Err(AppError::ConfigurationError(_))));
}

#[tokio::test]
async fn full_pass_against_http_remote() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/inspections"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "srv-100" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/inspections/srv-100/photos"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "path": "inspections/srv-100/kitchen.jpg" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/inspections/srv-100/items"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "item-5" })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().expect("tempdir");
    let config = config_for(&dir.path().join("inspections.db"), &server.uri());
    let state = AppState::initialize(config.clone()).await.expect("initialize");
    let service = &state.service;

    let draft = service
        .save_draft(&InspectionDraft::new("prop-http", InspectionKind::MoveIn))
        .await
        .expect("save draft");
    let item = InspectionItem::new(draft.local_id.clone(), "Kitchen", "Oven", ItemCondition::Fair);
    let photo = service
        .save_photo(&InspectionPhoto::new(
            draft.local_id.clone(),
            Some(item.local_id.clone()),
            vec![0xFF, 0xD8, 0xFF],
            "image/jpeg",
            "kitchen.jpg",
        ))
        .await
        .expect("save photo");
    service
        .save_item(&item.with_photos(vec![photo.local_id.clone()]))
        .await
        .expect("save item");

    let report = service
        .trigger_sync()
        .await
        .expect("trigger")
        .expect("pass ran");
    assert_eq!(report.synced, 1);
    assert_eq!(report.items_synced, 1);
    assert_eq!(report.photos_uploaded, 1);
    assert!(report.errors.is_empty());

    let again = service
        .trigger_sync()
        .await
        .expect("trigger")
        .expect("pass ran");
    assert_eq!(again.synced, 0);
    state.shutdown().await;

    let reopened = AppState::initialize_with_connectivity(config, Some(false))
        .await
        .expect("reinitialize");
    let stats = reopened.service.pending_counts().await.expect("stats");
    assert_eq!(stats.pending_total(), 0);
    assert_eq!(stats.drafts_total, 1);
    reopened.shutdown().await;
}
