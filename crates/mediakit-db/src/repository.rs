use crate::store::{MediaStore, Visibility};
use mediakit_core::models::{
    MediaFilter, MediaPatch, MediaRecord, NewMediaRecord, PagedResult, Pagination,
};
use mediakit_core::AppResult;
use std::sync::Arc;
use uuid::Uuid;

/// Typed access to media records on top of a [`MediaStore`].
///
/// Reads are split into `*_active` and `*_any` variants so callers state the
/// visibility they need instead of passing a flag.
#[derive(Clone)]
pub struct MediaRepository {
    store: Arc<dyn MediaStore>,
}

impl MediaRepository {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, record: NewMediaRecord) -> AppResult<MediaRecord> {
        let created = self.store.create(record).await?;
        tracing::debug!(
            media_id = %created.id,
            file_name = %created.file_name,
            "Media record created"
        );
        Ok(created)
    }

    pub async fn find_active(&self, id: Uuid) -> AppResult<Option<MediaRecord>> {
        self.store.find_by_id(id, Visibility::Active).await
    }

    pub async fn find_any(&self, id: Uuid) -> AppResult<Option<MediaRecord>> {
        self.store.find_by_id(id, Visibility::Any).await
    }

    pub async fn find_active_many(&self, ids: &[Uuid]) -> AppResult<Vec<MediaRecord>> {
        self.store.find_by_ids(ids, Visibility::Active).await
    }

    pub async fn find_any_many(&self, ids: &[Uuid]) -> AppResult<Vec<MediaRecord>> {
        self.store.find_by_ids(ids, Visibility::Any).await
    }

    /// One page of matching records, newest first, with the total count.
    pub async fn list(
        &self,
        filter: &MediaFilter,
        pagination: Pagination,
    ) -> AppResult<PagedResult<MediaRecord>> {
        let (data, total) = tokio::try_join!(
            self.store
                .find(filter, pagination.skip(), Some(pagination.limit)),
            self.store.count(filter),
        )?;

        Ok(PagedResult::new(data, total, pagination))
    }

    /// Every matching record, newest first.
    pub async fn list_all(&self, filter: &MediaFilter) -> AppResult<Vec<MediaRecord>> {
        self.store.find(filter, 0, None).await
    }

    pub async fn update(&self, id: Uuid, patch: &MediaPatch) -> AppResult<Option<MediaRecord>> {
        self.store.update_by_id(id, patch).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.store.delete_by_id(id).await
    }

    pub async fn update_many(&self, ids: &[Uuid], patch: &MediaPatch) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.store.update_many(ids, patch).await
    }

    pub async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.store.delete_many(ids).await
    }
}
