//! Media pipeline
//!
//! Upload flow: validate → derive media type → name and key → (image: normalize +
//! thumbnail) → store object(s) → create record. The record is written only after
//! every object write succeeded, so a record never points at a missing object.
//! Objects written before a later step fails are left in place; orphan
//! reconciliation happens outside this service.

use super::types::UploadFile;
use crate::naming::{extension_for, generate_file_name};
use mediakit_core::models::{
    BulkResult, Dimensions, MediaFilter, MediaMetadata, MediaPatch, MediaRecord, MediaType,
    NewMediaRecord, PagedResult, Pagination, Placement, Thumbnail,
};
use mediakit_core::{AppError, AppResult, Config, ImageConfig, PipelineConfig};
use mediakit_db::MediaRepository;
use mediakit_processing::validator::normalize_content_type;
use mediakit_processing::{
    ImageTransformer, MediaValidator, ProcessingError, Rendition, VideoMetadata, VideoProbe,
};
use mediakit_storage::{keys, Storage, StoredObject};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use uuid::Uuid;

#[derive(Clone)]
pub struct MediaService {
    repository: MediaRepository,
    storage: Arc<dyn Storage>,
    validator: MediaValidator,
    transformer: ImageTransformer,
    video_probe: Option<VideoProbe>,
    thumbnail_size: (u32, u32),
    upload_permits: Arc<Semaphore>,
    operation_timeout: Duration,
    signed_url_ttl: Duration,
}

impl MediaService {
    pub fn new(
        repository: MediaRepository,
        storage: Arc<dyn Storage>,
        validator: MediaValidator,
        transformer: ImageTransformer,
    ) -> Self {
        let image = ImageConfig::default();
        let pipeline = PipelineConfig::default();

        Self {
            repository,
            storage,
            validator,
            transformer,
            video_probe: None,
            thumbnail_size: (image.thumbnail_width, image.thumbnail_height),
            upload_permits: Arc::new(Semaphore::new(pipeline.upload_concurrency.max(1))),
            operation_timeout: Duration::from_secs(pipeline.operation_timeout_secs),
            signed_url_ttl: Duration::from_secs(pipeline.signed_url_ttl_secs),
        }
    }

    /// Build the service from loaded configuration.
    pub fn from_config(
        config: &Config,
        repository: MediaRepository,
        storage: Arc<dyn Storage>,
    ) -> AppResult<Self> {
        let transformer = ImageTransformer::from_config(&config.image)?;
        let video_probe = VideoProbe::new(config.pipeline.ffprobe_path.clone())?;

        Ok(Self::new(
            repository,
            storage,
            MediaValidator::from_config(&config.validation),
            transformer,
        )
        .with_pipeline(&config.pipeline)
        .with_thumbnail_size(config.image.thumbnail_width, config.image.thumbnail_height)
        .with_video_probe(video_probe))
    }

    pub fn with_pipeline(mut self, pipeline: &PipelineConfig) -> Self {
        self.upload_permits = Arc::new(Semaphore::new(pipeline.upload_concurrency.max(1)));
        self.operation_timeout = Duration::from_secs(pipeline.operation_timeout_secs.max(1));
        self.signed_url_ttl = Duration::from_secs(pipeline.signed_url_ttl_secs);
        self
    }

    pub fn with_thumbnail_size(mut self, width: u32, height: u32) -> Self {
        self.thumbnail_size = (width.max(1), height.max(1));
        self
    }

    pub fn with_video_probe(mut self, probe: VideoProbe) -> Self {
        self.video_probe = Some(probe);
        self
    }

    /// Validate, transform and store one file, then create its record.
    #[tracing::instrument(skip(self, file, placement), fields(
        media.entity_type = %placement.entity_type,
        media.entity_id = %placement.entity_id,
        media.field_name = %placement.field_name,
        media.content_type = %file.content_type,
        media.size = file.size(),
    ))]
    pub async fn upload(
        &self,
        file: UploadFile,
        placement: &Placement,
        uploaded_by: &str,
    ) -> AppResult<MediaRecord> {
        let start = Instant::now();
        let _permit = self
            .upload_permits
            .acquire()
            .await
            .map_err(|e| AppError::Internal(format!("Upload limiter closed: {}", e)))?;

        self.validator.validate(&file.content_type, file.size())?;

        let mime_type = normalize_content_type(&file.content_type);
        let media_type = MediaType::from_content_type(&mime_type)
            .ok_or_else(|| AppError::UnsupportedType(file.content_type.clone()))?;

        let new_record = match media_type {
            MediaType::Image => {
                self.store_image(file, mime_type, placement, uploaded_by)
                    .await?
            }
            MediaType::Video | MediaType::Document => {
                self.store_original(file, mime_type, media_type, placement, uploaded_by)
                    .await?
            }
        };

        let record = self.repository.create(new_record).await?;

        tracing::info!(
            media.id = %record.id,
            media_type = %record.media_type,
            file_name = %record.file_name,
            storage_path = %record.storage_path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Media uploaded"
        );

        Ok(record)
    }

    /// Upload files one at a time in order. The first failure aborts the rest and
    /// is returned; records created before it are kept.
    #[tracing::instrument(skip(self, files, placement), fields(media.batch_size = files.len()))]
    pub async fn upload_many(
        &self,
        files: Vec<UploadFile>,
        placement: &Placement,
        uploaded_by: &str,
    ) -> AppResult<Vec<MediaRecord>> {
        let mut records = Vec::with_capacity(files.len());

        for (index, file) in files.into_iter().enumerate() {
            match self.upload(file, placement, uploaded_by).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        index,
                        completed = records.len(),
                        error = %e,
                        "Batch upload aborted"
                    );
                    return Err(e);
                }
            }
        }

        Ok(records)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<MediaRecord> {
        self.repository
            .find_active(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Administrative single-get that also returns soft-deleted records.
    pub async fn get_any(&self, id: Uuid) -> AppResult<MediaRecord> {
        self.repository
            .find_any(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list(
        &self,
        filter: &MediaFilter,
        pagination: Pagination,
    ) -> AppResult<PagedResult<MediaRecord>> {
        self.repository.list(filter, pagination).await
    }

    /// All active media of one owner, newest first, unpaginated.
    pub async fn list_by_placement(
        &self,
        entity_type: &str,
        entity_id: &str,
        field_name: Option<&str>,
    ) -> AppResult<Vec<MediaRecord>> {
        let filter = MediaFilter::for_placement(entity_type, entity_id, field_name);
        self.repository.list_all(&filter).await
    }

    #[tracing::instrument(skip(self), fields(media.id = %id))]
    pub async fn update(&self, id: Uuid, patch: MediaPatch) -> AppResult<MediaRecord> {
        self.repository
            .update(id, &patch)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Mark an active record inactive. Stored objects are untouched.
    #[tracing::instrument(skip(self), fields(media.id = %id))]
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let record = self.get(id).await?;
        self.repository
            .update(record.id, &MediaPatch::deactivate())
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(media.id = %id, "Media soft-deleted");
        Ok(())
    }

    /// Remove the stored objects and the record, whether or not it is active.
    #[tracing::instrument(skip(self), fields(media.id = %id))]
    pub async fn hard_delete(&self, id: Uuid) -> AppResult<()> {
        let record = self
            .repository
            .find_any(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        self.remove_objects(&object_keys(&record)).await?;
        self.repository.delete(record.id).await?;

        tracing::info!(
            media.id = %id,
            storage_path = %record.storage_path,
            "Media hard-deleted"
        );
        Ok(())
    }

    /// Soft-delete every active record among `ids`. Unknown or already inactive
    /// ids are reported in `failed`.
    #[tracing::instrument(skip(self, ids), fields(media.batch_size = ids.len()))]
    pub async fn bulk_soft_delete(&self, ids: &[Uuid]) -> AppResult<BulkResult> {
        let ids = dedupe(ids);
        if ids.is_empty() {
            return Ok(BulkResult::default());
        }

        let found = self.repository.find_active_many(&ids).await?;
        let found_ids: Vec<Uuid> = found.iter().map(|r| r.id).collect();
        let failed = missing(&ids, &found_ids);

        let deleted = self
            .repository
            .update_many(&found_ids, &MediaPatch::deactivate())
            .await?;

        tracing::info!(deleted, failed = failed.len(), "Bulk soft delete completed");
        Ok(BulkResult { deleted, failed })
    }

    /// Hard-delete every known record among `ids`: one batch delete of all their
    /// objects, then one batch delete of the records. A failing batch object delete
    /// aborts before any record is removed.
    #[tracing::instrument(skip(self, ids), fields(media.batch_size = ids.len()))]
    pub async fn bulk_hard_delete(&self, ids: &[Uuid]) -> AppResult<BulkResult> {
        let ids = dedupe(ids);
        if ids.is_empty() {
            return Ok(BulkResult::default());
        }

        let found = self.repository.find_any_many(&ids).await?;
        let found_ids: Vec<Uuid> = found.iter().map(|r| r.id).collect();
        let failed = missing(&ids, &found_ids);

        let keys: Vec<String> = found.iter().flat_map(object_keys).collect();
        self.remove_objects(&keys).await?;
        let deleted = self.repository.delete_many(&found_ids).await?;

        tracing::info!(
            deleted,
            failed = failed.len(),
            objects = keys.len(),
            "Bulk hard delete completed"
        );
        Ok(BulkResult { deleted, failed })
    }

    /// Time-bounded URL for an active record. `None` uses the configured default TTL.
    pub async fn signed_url(&self, id: Uuid, ttl: Option<Duration>) -> AppResult<String> {
        let record = self.get(id).await?;
        let ttl = ttl.unwrap_or(self.signed_url_ttl);

        self.timed("storage.sign", async {
            self.storage
                .signed_url(&record.storage_path, ttl)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    async fn store_image(
        &self,
        file: UploadFile,
        mime_type: String,
        placement: &Placement,
        uploaded_by: &str,
    ) -> AppResult<NewMediaRecord> {
        let format = self.transformer.output_format();
        let file_name = generate_file_name(format.extension());
        let storage_path = keys::storage_path(placement, &file_name)?;
        let thumbnail_path = keys::thumbnail_key(&storage_path);
        let original_size = file.size() as u64;

        let (primary, thumbnail) = self.render_image(file.data).await?;

        let stored = self
            .put(&storage_path, primary.data, format.to_mime_type())
            .await?;
        let stored_thumbnail = self
            .put(&thumbnail_path, thumbnail.data, format.to_mime_type())
            .await?;

        Ok(NewMediaRecord {
            file_name,
            url: stored.url,
            thumbnail: Thumbnail {
                url: stored_thumbnail.url,
                width: thumbnail.info.width,
                height: thumbnail.info.height,
            },
            media_type: MediaType::Image,
            metadata: MediaMetadata {
                original_name: file.original_name,
                mime_type,
                size: original_size,
                dimensions: Some(Dimensions {
                    width: primary.info.width,
                    height: primary.info.height,
                }),
                duration: None,
                format: Some(primary.info.format),
            },
            placement: placement.clone(),
            uploaded_by: uploaded_by.to_string(),
            storage_provider: self.storage.backend_type(),
            storage_path,
            is_processed: true,
        })
    }

    async fn store_original(
        &self,
        file: UploadFile,
        mime_type: String,
        media_type: MediaType,
        placement: &Placement,
        uploaded_by: &str,
    ) -> AppResult<NewMediaRecord> {
        let extension = extension_for(&file.original_name, &mime_type);
        let file_name = generate_file_name(&extension);
        let storage_path = keys::storage_path(placement, &file_name)?;
        let size = file.size() as u64;

        let video = match media_type {
            MediaType::Video => self.probe_video(&file.data).await,
            _ => None,
        };

        let stored = self.put(&storage_path, file.data, &mime_type).await?;

        let dimensions = video
            .as_ref()
            .filter(|v| v.width > 0 && v.height > 0)
            .map(|v| Dimensions {
                width: v.width,
                height: v.height,
            });

        Ok(NewMediaRecord {
            file_name,
            url: stored.url,
            thumbnail: Thumbnail::default(),
            media_type,
            metadata: MediaMetadata {
                original_name: file.original_name,
                mime_type,
                size,
                dimensions,
                duration: video.as_ref().and_then(|v| v.duration),
                format: video.map(|v| v.codec),
            },
            placement: placement.clone(),
            uploaded_by: uploaded_by.to_string(),
            storage_provider: self.storage.backend_type(),
            storage_path,
            is_processed: false,
        })
    }

    async fn render_image(&self, data: Vec<u8>) -> AppResult<(Rendition, Rendition)> {
        let transformer = self.transformer.clone();
        let (width, height) = self.thumbnail_size;

        self.timed("image.transform", async move {
            tokio::task::spawn_blocking(move || -> Result<_, ProcessingError> {
                let primary = transformer.normalize(&data)?;
                let thumbnail = transformer.thumbnail(&data, width, height)?;
                Ok((primary, thumbnail))
            })
            .await
            .map_err(|e| AppError::Internal(format!("Image task failed: {}", e)))?
            .map_err(AppError::from)
        })
        .await
    }

    /// Best-effort: a missing or failing ffprobe leaves duration and dimensions unset.
    async fn probe_video(&self, data: &[u8]) -> Option<VideoMetadata> {
        let probe = self.video_probe.as_ref()?;

        let result = self
            .timed("video.probe", async {
                probe.probe(data).await.map_err(AppError::from)
            })
            .await;

        match result {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::warn!(error = %e, "Video probe failed, storing without duration");
                None
            }
        }
    }

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> AppResult<StoredObject> {
        self.timed("storage.upload", async {
            self.storage
                .upload(key, data, content_type)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    async fn remove_objects(&self, keys: &[String]) -> AppResult<()> {
        self.timed("storage.delete", async {
            self.storage.delete_many(keys).await.map_err(AppError::from)
        })
        .await
    }

    async fn timed<T, F>(&self, operation: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let seconds = self.operation_timeout.as_secs();
        tokio::time::timeout(self.operation_timeout, fut)
            .await
            .map_err(|_| {
                tracing::warn!(operation, timeout_secs = seconds, "Operation timed out");
                AppError::Timeout {
                    operation: operation.to_string(),
                    seconds,
                }
            })?
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Media {} not found", id))
}

/// Storage keys owned by a record: the primary object and, for images, its thumbnail.
fn object_keys(record: &MediaRecord) -> Vec<String> {
    let mut keys = vec![record.storage_path.clone()];
    if record.has_thumbnail() {
        keys.push(keys::thumbnail_key(&record.storage_path));
    }
    keys
}

fn dedupe(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn missing(requested: &[Uuid], found: &[Uuid]) -> Vec<Uuid> {
    let found: HashSet<&Uuid> = found.iter().collect();
    requested
        .iter()
        .filter(|id| !found.contains(id))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_keeps_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedupe(&[a, b, a, b, a]), vec![a, b]);
    }

    #[test]
    fn test_missing_reports_unknown_ids_in_request_order() {
        let known = Uuid::new_v4();
        let unknown_1 = Uuid::new_v4();
        let unknown_2 = Uuid::new_v4();

        assert_eq!(
            missing(&[unknown_1, known, unknown_2], &[known]),
            vec![unknown_1, unknown_2]
        );
    }
}
