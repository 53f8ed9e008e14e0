pub(super) const UPSERT_DRAFT: &str = r#"
    INSERT INTO inspection_drafts (
        local_id, lease_id, property_id, kind, note, status, synced, created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8)
    ON CONFLICT(local_id) DO UPDATE SET
        lease_id = excluded.lease_id,
        property_id = excluded.property_id,
        kind = excluded.kind,
        note = excluded.note,
        status = excluded.status,
        blocked_reason = NULL,
        revision = inspection_drafts.revision + 1,
        updated_at = excluded.updated_at
    WHERE inspection_drafts.synced = 0
"#;

pub(super) const SELECT_DRAFT_BY_LOCAL_ID: &str = r#"
    SELECT seq, local_id, server_id, lease_id, property_id, kind, note, status, synced,
           blocked_reason, revision, created_at, updated_at
    FROM inspection_drafts
    WHERE local_id = ?1
"#;

pub(super) const SELECT_UNSYNCED_DRAFTS: &str = r#"
    SELECT seq, local_id, server_id, lease_id, property_id, kind, note, status, synced,
           blocked_reason, revision, created_at, updated_at
    FROM inspection_drafts
    WHERE synced = 0 AND blocked_reason IS NULL
    ORDER BY seq ASC
"#;

pub(super) const SELECT_DRAFTS_WITH_PENDING_CHILDREN: &str = r#"
    SELECT d.seq, d.local_id, d.server_id, d.lease_id, d.property_id, d.kind, d.note,
           d.status, d.synced, d.blocked_reason, d.revision, d.created_at, d.updated_at
    FROM inspection_drafts d
    WHERE d.synced = 1
      AND (
          EXISTS (
              SELECT 1 FROM inspection_items i
              WHERE i.draft_local_id = d.local_id AND i.synced = 0
          )
          OR EXISTS (
              SELECT 1 FROM inspection_photos p
              WHERE p.draft_local_id = d.local_id AND p.sync_state != 'uploaded'
          )
      )
    ORDER BY d.seq ASC
"#;

pub(super) const ATTACH_DRAFT_SERVER_ID: &str = r#"
    UPDATE inspection_drafts
    SET server_id = ?2, updated_at = ?3
    WHERE local_id = ?1 AND synced = 0
"#;

pub(super) const MARK_DRAFT_SYNCED: &str = r#"
    UPDATE inspection_drafts
    SET synced = 1, server_id = ?2, blocked_reason = NULL, updated_at = ?3
    WHERE local_id = ?1 AND revision = ?4
"#;

pub(super) const MARK_DRAFT_BLOCKED: &str = r#"
    UPDATE inspection_drafts
    SET blocked_reason = ?2, updated_at = ?3
    WHERE local_id = ?1 AND synced = 0
"#;

pub(super) const UPSERT_ITEM: &str = r#"
    INSERT INTO inspection_items (
        local_id, draft_local_id, room, label, condition, note, photo_ids, synced,
        created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9)
    ON CONFLICT(local_id) DO UPDATE SET
        room = excluded.room,
        label = excluded.label,
        condition = excluded.condition,
        note = excluded.note,
        photo_ids = excluded.photo_ids,
        updated_at = excluded.updated_at
    WHERE inspection_items.synced = 0
"#;

pub(super) const SELECT_ITEM_BY_LOCAL_ID: &str = r#"
    SELECT seq, local_id, draft_local_id, room, label, condition, note, photo_ids, synced,
           server_id, created_at, updated_at
    FROM inspection_items
    WHERE local_id = ?1
"#;

pub(super) const SELECT_ITEMS_BY_DRAFT: &str = r#"
    SELECT seq, local_id, draft_local_id, room, label, condition, note, photo_ids, synced,
           server_id, created_at, updated_at
    FROM inspection_items
    WHERE draft_local_id = ?1
    ORDER BY seq ASC
"#;

pub(super) const MARK_ITEM_SYNCED: &str = r#"
    UPDATE inspection_items
    SET synced = 1, server_id = COALESCE(?2, server_id), updated_at = ?3
    WHERE local_id = ?1
"#;

pub(super) const UPSERT_PHOTO: &str = r#"
    INSERT INTO inspection_photos (
        local_id, draft_local_id, item_local_id, payload, mime_type, file_name, sync_state,
        upload_attempts, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', 0, ?7)
    ON CONFLICT(local_id) DO UPDATE SET
        item_local_id = excluded.item_local_id,
        payload = excluded.payload,
        mime_type = excluded.mime_type,
        file_name = excluded.file_name
"#;

pub(super) const SELECT_PHOTO_BY_LOCAL_ID: &str = r#"
    SELECT seq, local_id, draft_local_id, item_local_id, payload, mime_type, file_name,
           sync_state, server_path, upload_attempts, last_error, created_at
    FROM inspection_photos
    WHERE local_id = ?1
"#;

pub(super) const SELECT_PHOTOS_BY_DRAFT: &str = r#"
    SELECT seq, local_id, draft_local_id, item_local_id, payload, mime_type, file_name,
           sync_state, server_path, upload_attempts, last_error, created_at
    FROM inspection_photos
    WHERE draft_local_id = ?1
    ORDER BY seq ASC
"#;

pub(super) const MARK_PHOTO_UPLOADED: &str = r#"
    UPDATE inspection_photos
    SET sync_state = 'uploaded',
        server_path = ?2,
        upload_attempts = upload_attempts + 1,
        last_error = NULL
    WHERE local_id = ?1
"#;

pub(super) const MARK_PHOTO_FAILED: &str = r#"
    UPDATE inspection_photos
    SET sync_state = 'failed',
        upload_attempts = upload_attempts + 1,
        last_error = ?2
    WHERE local_id = ?1 AND sync_state != 'uploaded'
"#;

pub(super) const INSERT_SYNC_ENTRY: &str = r#"
    INSERT INTO sync_queue (
        action_type, entity_type, entity_local_id, payload, status, retry_count,
        created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, 'pending', 0, ?5, ?5)
"#;

pub(super) const SELECT_SYNC_ENTRY_BY_ID: &str = r#"
    SELECT id, action_type, entity_type, entity_local_id, payload, status, retry_count,
           last_error, created_at, updated_at
    FROM sync_queue
    WHERE id = ?1
"#;

pub(super) const SELECT_PENDING_SYNC_ENTRIES: &str = r#"
    SELECT id, action_type, entity_type, entity_local_id, payload, status, retry_count,
           last_error, created_at, updated_at
    FROM sync_queue
    WHERE status IN ('pending', 'processing')
    ORDER BY id ASC
"#;

pub(super) const UPDATE_SYNC_ENTRY: &str = r#"
    UPDATE sync_queue
    SET status = ?2, retry_count = ?3, last_error = ?4, updated_at = ?5
    WHERE id = ?1 AND status NOT IN ('completed', 'failed')
"#;

pub(super) const SELECT_STATS: &str = r#"
    SELECT
        (SELECT COUNT(*) FROM inspection_drafts) AS drafts_total,
        (SELECT COUNT(*) FROM inspection_drafts WHERE synced = 0) AS drafts_unsynced,
        (SELECT COUNT(*) FROM inspection_items) AS items_total,
        (SELECT COUNT(*) FROM inspection_items WHERE synced = 0) AS items_unsynced,
        (SELECT COUNT(*) FROM inspection_photos) AS photos_total,
        (SELECT COUNT(*) FROM inspection_photos WHERE sync_state != 'uploaded') AS photos_unsynced,
        (SELECT COUNT(*) FROM sync_queue WHERE status IN ('pending', 'processing')) AS queue_pending,
        (SELECT COUNT(*) FROM sync_queue WHERE status = 'failed') AS queue_failed
"#;

pub(super) const CLEAR_TABLES: [&str; 4] = [
    "DELETE FROM inspection_photos",
    "DELETE FROM inspection_items",
    "DELETE FROM inspection_drafts",
    "DELETE FROM sync_queue",
];
