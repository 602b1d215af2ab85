//! In-process media store.
//!
//! Records live in insertion order, which is also creation order, so newest-first
//! listing is a reverse scan.

use crate::store::{MediaStore, Visibility};
use async_trait::async_trait;
use chrono::Utc;
use mediakit_core::models::{MediaFilter, MediaPatch, MediaRecord, NewMediaRecord};
use mediakit_core::{AppError, AppResult};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryMediaStore {
    records: RwLock<Vec<MediaRecord>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn matches(record: &MediaRecord, filter: &MediaFilter) -> bool {
    let placement = &record.placement;
    filter
        .entity_type
        .as_ref()
        .map_or(true, |v| *v == placement.entity_type)
        && filter
            .entity_id
            .as_ref()
            .map_or(true, |v| *v == placement.entity_id)
        && filter
            .field_name
            .as_ref()
            .map_or(true, |v| *v == placement.field_name)
        && filter
            .uploaded_by
            .as_ref()
            .map_or(true, |v| *v == record.uploaded_by)
        && filter.media_type.map_or(true, |t| t == record.media_type)
        && filter.is_active.map_or(true, |a| a == record.is_active)
}

fn apply_patch(record: &mut MediaRecord, patch: &MediaPatch) {
    if patch.is_empty() {
        return;
    }
    if let Some(is_active) = patch.is_active {
        record.is_active = is_active;
    }
    if let Some(is_processed) = patch.is_processed {
        record.is_processed = is_processed;
    }
    record.updated_at = Utc::now();
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn create(&self, record: NewMediaRecord) -> AppResult<MediaRecord> {
        let mut records = self.records.write().await;

        if records.iter().any(|r| r.file_name == record.file_name) {
            return Err(AppError::Conflict(format!(
                "file_name already exists: {}",
                record.file_name
            )));
        }
        if records.iter().any(|r| r.storage_path == record.storage_path) {
            return Err(AppError::Conflict(format!(
                "storage_path already exists: {}",
                record.storage_path
            )));
        }

        let created = record.into_record(Uuid::new_v4(), Utc::now());
        records.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        visibility: Visibility,
    ) -> AppResult<Option<MediaRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.id == id && visibility.admits(r))
            .cloned())
    }

    async fn find_by_ids(
        &self,
        ids: &[Uuid],
        visibility: Visibility,
    ) -> AppResult<Vec<MediaRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| ids.contains(&r.id) && visibility.admits(r))
            .cloned()
            .collect())
    }

    async fn find(
        &self,
        filter: &MediaFilter,
        skip: u64,
        limit: Option<u64>,
    ) -> AppResult<Vec<MediaRecord>> {
        let records = self.records.read().await;
        let take = limit.map_or(usize::MAX, |l| l as usize);
        Ok(records
            .iter()
            .rev()
            .filter(|r| matches(r, filter))
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(take)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &MediaFilter) -> AppResult<u64> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| matches(r, filter)).count() as u64)
    }

    async fn update_by_id(&self, id: Uuid, patch: &MediaPatch) -> AppResult<Option<MediaRecord>> {
        let mut records = self.records.write().await;
        Ok(records.iter_mut().find(|r| r.id == id).map(|record| {
            apply_patch(record, patch);
            record.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }

    async fn update_many(&self, ids: &[Uuid], patch: &MediaPatch) -> AppResult<u64> {
        let mut records = self.records.write().await;
        let mut updated = 0;
        for record in records.iter_mut().filter(|r| ids.contains(&r.id)) {
            apply_patch(record, patch);
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !ids.contains(&r.id));
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediakit_core::models::{MediaMetadata, MediaType, Placement, Thumbnail};
    use mediakit_core::StorageProvider;

    fn new_record(name: &str, placement: Placement) -> NewMediaRecord {
        NewMediaRecord {
            file_name: name.to_string(),
            url: format!("http://localhost/{}", name),
            thumbnail: Thumbnail::default(),
            media_type: MediaType::Document,
            metadata: MediaMetadata {
                original_name: "doc.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                size: 3,
                dimensions: None,
                duration: None,
                format: None,
            },
            storage_path: format!(
                "{}/{}/{}/{}",
                placement.entity_type, placement.entity_id, placement.field_name, name
            ),
            placement,
            uploaded_by: "tester".to_string(),
            storage_provider: StorageProvider::LocalDisk,
            is_processed: false,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_identity_and_defaults() {
        let store = MemoryMediaStore::new();
        let record = store
            .create(new_record("a.pdf", Placement::new("user", "1", "docs")))
            .await
            .unwrap();

        assert!(record.is_active);
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_file_name() {
        let store = MemoryMediaStore::new();
        store
            .create(new_record("a.pdf", Placement::new("user", "1", "docs")))
            .await
            .unwrap();

        let result = store
            .create(new_record("a.pdf", Placement::new("user", "2", "docs")))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_find_is_newest_first_and_filtered() {
        let store = MemoryMediaStore::new();
        let placement = Placement::new("user", "1", "docs");
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            store.create(new_record(name, placement.clone())).await.unwrap();
        }
        store
            .create(new_record("other.pdf", Placement::new("user", "2", "docs")))
            .await
            .unwrap();

        let filter = MediaFilter::active().with_placement(&placement);
        let found = store.find(&filter, 0, None).await.unwrap();
        let names: Vec<_> = found.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["c.pdf", "b.pdf", "a.pdf"]);

        let page = store.find(&filter, 1, Some(1)).await.unwrap();
        assert_eq!(page[0].file_name, "b.pdf");
        assert_eq!(store.count(&filter).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_visibility_excludes_inactive() {
        let store = MemoryMediaStore::new();
        let record = store
            .create(new_record("a.pdf", Placement::new("user", "1", "docs")))
            .await
            .unwrap();
        store
            .update_by_id(record.id, &MediaPatch::deactivate())
            .await
            .unwrap();

        assert!(store
            .find_by_id(record.id, Visibility::Active)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_id(record.id, Visibility::Any)
            .await
            .unwrap()
            .is_some());
        assert_eq!(store.count(&MediaFilter::active()).await.unwrap(), 0);
        assert_eq!(store.count(&MediaFilter::any()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_operations_count_matches() {
        let store = MemoryMediaStore::new();
        let a = store
            .create(new_record("a.pdf", Placement::new("user", "1", "docs")))
            .await
            .unwrap();
        let b = store
            .create(new_record("b.pdf", Placement::new("user", "1", "docs")))
            .await
            .unwrap();
        let unknown = Uuid::new_v4();

        let updated = store
            .update_many(&[a.id, unknown], &MediaPatch::deactivate())
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let deleted = store.delete_many(&[a.id, b.id, unknown]).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(store.is_empty().await);
    }
}
