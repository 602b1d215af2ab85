use async_trait::async_trait;
use mediakit_core::models::{MediaFilter, MediaPatch, MediaRecord, NewMediaRecord};
use mediakit_core::AppResult;
use uuid::Uuid;

/// Which records a by-id lookup may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only records with `is_active = true`
    Active,
    /// Active and soft-deleted records
    Any,
}

impl Visibility {
    pub fn admits(self, record: &MediaRecord) -> bool {
        match self {
            Visibility::Active => record.is_active,
            Visibility::Any => true,
        }
    }
}

/// Document-store contract for media records.
///
/// Single-record mutations rely on the store's per-record atomicity. Batch
/// mutations are scoped to an explicit id set, never a collection scan.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Insert a record. The store assigns the id and both timestamps.
    ///
    /// Fails with `Conflict` when `file_name` or `storage_path` is already taken.
    async fn create(&self, record: NewMediaRecord) -> AppResult<MediaRecord>;

    async fn find_by_id(&self, id: Uuid, visibility: Visibility)
        -> AppResult<Option<MediaRecord>>;

    async fn find_by_ids(&self, ids: &[Uuid], visibility: Visibility)
        -> AppResult<Vec<MediaRecord>>;

    /// Records matching `filter`, newest first. `limit: None` is unbounded.
    async fn find(
        &self,
        filter: &MediaFilter,
        skip: u64,
        limit: Option<u64>,
    ) -> AppResult<Vec<MediaRecord>>;

    async fn count(&self, filter: &MediaFilter) -> AppResult<u64>;

    /// Apply a patch regardless of visibility. Returns the updated record.
    async fn update_by_id(&self, id: Uuid, patch: &MediaPatch) -> AppResult<Option<MediaRecord>>;

    /// Returns whether a record was removed.
    async fn delete_by_id(&self, id: Uuid) -> AppResult<bool>;

    /// Returns the number of records updated.
    async fn update_many(&self, ids: &[Uuid], patch: &MediaPatch) -> AppResult<u64>;

    /// Returns the number of records removed.
    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64>;
}
