mod helpers;

use helpers::*;
use mediakit_core::models::{MediaFilter, MediaPatch, MediaType, Pagination};
use mediakit_core::AppError;
use std::time::Duration;
use uuid::Uuid;

#[tokio::test]
async fn test_get_hides_soft_deleted_records() {
    let ctx = setup().await;
    let record = ctx
        .service
        .upload(pdf_upload(), &documents(), "agent-1")
        .await
        .unwrap();

    assert_eq!(ctx.service.get(record.id).await.unwrap().id, record.id);

    ctx.service.soft_delete(record.id).await.unwrap();

    assert!(matches!(
        ctx.service.get(record.id).await,
        Err(AppError::NotFound(_))
    ));
    let admin = ctx.service.get_any(record.id).await.unwrap();
    assert!(!admin.is_active);

    // Soft delete leaves the object in place.
    assert!(ctx.storage.exists(&record.storage_path).await.unwrap());
}

#[tokio::test]
async fn test_soft_delete_unknown_id_is_not_found() {
    let ctx = setup().await;
    assert!(matches!(
        ctx.service.soft_delete(Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_filters_paginates_and_excludes_inactive() {
    let ctx = setup().await;
    let mut ids = Vec::new();
    for _ in 0..3 {
        let record = ctx
            .service
            .upload(pdf_upload(), &documents(), "agent-1")
            .await
            .unwrap();
        ids.push(record.id);
    }
    ctx.service
        .upload(image_upload(32, 32), &avatar(), "user-42")
        .await
        .unwrap();
    ctx.service.soft_delete(ids[0]).await.unwrap();

    let filter = MediaFilter::for_placement("property", "p-7", Some("documents"));
    let page = ctx
        .service
        .list(&filter, Pagination::new(1, 1))
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, ids[2]);

    let images = ctx
        .service
        .list(
            &MediaFilter::active().with_media_type(MediaType::Image),
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(images.total, 1);

    let everything = ctx
        .service
        .list(&filter.with_active(None), Pagination::default())
        .await
        .unwrap();
    assert_eq!(everything.total, 3);
}

#[tokio::test]
async fn test_list_by_placement_is_active_only_and_unpaginated() {
    let ctx = setup().await;
    for _ in 0..25 {
        ctx.service
            .upload(pdf_upload(), &documents(), "agent-1")
            .await
            .unwrap();
    }
    let removed = ctx
        .service
        .upload(pdf_upload(), &documents(), "agent-1")
        .await
        .unwrap();
    ctx.service.soft_delete(removed.id).await.unwrap();

    let all = ctx
        .service
        .list_by_placement("property", "p-7", None)
        .await
        .unwrap();
    assert_eq!(all.len(), 25);
    assert!(all.iter().all(|r| r.is_active));
}

#[tokio::test]
async fn test_update_patches_flags_and_can_restore() {
    let ctx = setup().await;
    let record = ctx
        .service
        .upload(pdf_upload(), &documents(), "agent-1")
        .await
        .unwrap();
    ctx.service.soft_delete(record.id).await.unwrap();

    let restored = ctx
        .service
        .update(
            record.id,
            MediaPatch {
                is_active: Some(true),
                is_processed: Some(true),
            },
        )
        .await
        .unwrap();

    assert!(restored.is_active);
    assert!(restored.is_processed);
    assert!(restored.updated_at >= record.updated_at);
    assert_eq!(ctx.service.get(record.id).await.unwrap().id, record.id);

    assert!(matches!(
        ctx.service
            .update(Uuid::new_v4(), MediaPatch::deactivate())
            .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_hard_delete_removes_objects_of_soft_deleted_record() {
    let ctx = setup().await;
    let record = ctx
        .service
        .upload(image_upload(120, 90), &avatar(), "user-42")
        .await
        .unwrap();
    let thumbnail_key = format!("user/42/avatar/thumbnails/{}", record.file_name);
    assert!(ctx.storage.exists(&thumbnail_key).await.unwrap());

    ctx.service.soft_delete(record.id).await.unwrap();
    ctx.service.hard_delete(record.id).await.unwrap();

    assert!(!ctx.storage.exists(&record.storage_path).await.unwrap());
    assert!(!ctx.storage.exists(&thumbnail_key).await.unwrap());
    assert!(matches!(
        ctx.service.get_any(record.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        ctx.service.hard_delete(record.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_bulk_soft_delete_reports_unknown_ids() {
    let ctx = setup().await;
    let a = ctx
        .service
        .upload(pdf_upload(), &documents(), "agent-1")
        .await
        .unwrap();
    let b = ctx
        .service
        .upload(pdf_upload(), &documents(), "agent-1")
        .await
        .unwrap();
    let unknown_1 = Uuid::new_v4();
    let unknown_2 = Uuid::new_v4();

    let result = ctx
        .service
        .bulk_soft_delete(&[a.id, unknown_1, b.id, unknown_2])
        .await
        .unwrap();

    assert_eq!(result.deleted, 2);
    assert_eq!(result.failed, vec![unknown_1, unknown_2]);
    assert!(!ctx.service.get_any(a.id).await.unwrap().is_active);
    assert!(!ctx.service.get_any(b.id).await.unwrap().is_active);
    assert!(ctx.storage.exists(&a.storage_path).await.unwrap());
}

#[tokio::test]
async fn test_bulk_hard_delete_removes_found_and_reports_missing() {
    let ctx = setup().await;
    let image = ctx
        .service
        .upload(image_upload(64, 64), &avatar(), "user-42")
        .await
        .unwrap();
    let doc = ctx
        .service
        .upload(pdf_upload(), &documents(), "agent-1")
        .await
        .unwrap();
    ctx.service.soft_delete(doc.id).await.unwrap();
    let unknown = Uuid::new_v4();

    let result = ctx
        .service
        .bulk_hard_delete(&[image.id, doc.id, unknown])
        .await
        .unwrap();

    assert_eq!(result.deleted, 2);
    assert_eq!(result.failed, vec![unknown]);
    assert!(ctx.store.is_empty().await);
    assert!(!ctx.has_stored_files());
}

#[tokio::test]
async fn test_bulk_hard_delete_keeps_records_when_object_delete_fails() {
    let ctx = setup().await;
    let image = ctx
        .service
        .upload(image_upload(64, 64), &avatar(), "user-42")
        .await
        .unwrap();
    let doc = ctx
        .service
        .upload(pdf_upload(), &documents(), "agent-1")
        .await
        .unwrap();
    ctx.faults.fail_deletes();

    let result = ctx.service.bulk_hard_delete(&[image.id, doc.id]).await;

    match result {
        Err(AppError::StorageFailed { operation, .. }) => assert_eq!(operation, "delete"),
        other => panic!("expected a storage failure, got {:?}", other),
    }
    assert_eq!(ctx.store.len().await, 2);
    assert!(ctx.service.get(image.id).await.is_ok());
    assert!(ctx.service.get(doc.id).await.is_ok());
    assert!(ctx.storage.exists(&doc.storage_path).await.unwrap());
}

#[tokio::test]
async fn test_hard_delete_keeps_record_when_object_delete_fails() {
    let ctx = setup().await;
    let doc = ctx
        .service
        .upload(pdf_upload(), &documents(), "agent-1")
        .await
        .unwrap();
    ctx.faults.fail_deletes();

    assert!(matches!(
        ctx.service.hard_delete(doc.id).await,
        Err(AppError::StorageFailed { .. })
    ));
    assert_eq!(ctx.service.get_any(doc.id).await.unwrap().id, doc.id);
}

#[tokio::test]
async fn test_bulk_operations_on_empty_input() {
    let ctx = setup().await;

    let soft = ctx.service.bulk_soft_delete(&[]).await.unwrap();
    let hard = ctx.service.bulk_hard_delete(&[]).await.unwrap();

    assert_eq!(soft.deleted, 0);
    assert!(soft.failed.is_empty());
    assert_eq!(hard.deleted, 0);
    assert!(hard.failed.is_empty());
}

#[tokio::test]
async fn test_signed_url_on_local_disk_ignores_ttl() {
    let ctx = setup().await;
    let record = ctx
        .service
        .upload(pdf_upload(), &documents(), "agent-1")
        .await
        .unwrap();

    let short = ctx
        .service
        .signed_url(record.id, Some(Duration::from_secs(60)))
        .await
        .unwrap();
    let long = ctx
        .service
        .signed_url(record.id, Some(Duration::from_secs(86_400)))
        .await
        .unwrap();
    let default = ctx.service.signed_url(record.id, None).await.unwrap();

    assert_eq!(short, long);
    assert_eq!(short, default);
    assert_eq!(short, record.url);
}

#[tokio::test]
async fn test_signed_url_for_unknown_id_is_not_found() {
    let ctx = setup().await;
    assert!(matches!(
        ctx.service.signed_url(Uuid::new_v4(), None).await,
        Err(AppError::NotFound(_))
    ));
}
