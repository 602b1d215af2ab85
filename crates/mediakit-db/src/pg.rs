//! PostgreSQL media store.
//!
//! One row per record in the `media` table; `metadata` is a JSONB column holding
//! the serialized [`MediaMetadata`].

use crate::store::{MediaStore, Visibility};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mediakit_core::models::{
    MediaFilter, MediaMetadata, MediaPatch, MediaRecord, MediaType, NewMediaRecord, Placement,
    Thumbnail,
};
use mediakit_core::{AppError, AppResult, DatabaseConfig, StorageProvider};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Duration;
use uuid::Uuid;

const MEDIA_COLUMNS: &str = "id, file_name, url, thumbnail_url, thumbnail_width, thumbnail_height, \
     media_type, metadata, entity_type, entity_id, field_name, uploaded_by, storage_provider, \
     storage_path, is_processed, is_active, created_at, updated_at";

/// Row type for the media table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct MediaRow {
    pub id: Uuid,
    pub file_name: String,
    pub url: String,
    pub thumbnail_url: String,
    pub thumbnail_width: i32,
    pub thumbnail_height: i32,
    pub media_type: String,
    pub metadata: Json<MediaMetadata>,
    pub entity_type: String,
    pub entity_id: String,
    pub field_name: String,
    pub uploaded_by: String,
    pub storage_provider: String,
    pub storage_path: String,
    pub is_processed: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaRow {
    pub fn into_record(self) -> AppResult<MediaRecord> {
        let media_type = self
            .media_type
            .parse::<MediaType>()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let storage_provider = self
            .storage_provider
            .parse::<StorageProvider>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(MediaRecord {
            id: self.id,
            file_name: self.file_name,
            url: self.url,
            thumbnail: Thumbnail {
                url: self.thumbnail_url,
                width: self.thumbnail_width.max(0) as u32,
                height: self.thumbnail_height.max(0) as u32,
            },
            media_type,
            metadata: self.metadata.0,
            placement: Placement {
                entity_type: self.entity_type,
                entity_id: self.entity_id,
                field_name: self.field_name,
            },
            uploaded_by: self.uploaded_by,
            storage_provider,
            storage_path: self.storage_path,
            is_processed: self.is_processed,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgMediaStore {
    pool: PgPool,
}

impl PgMediaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool sized by configuration.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| AppError::InvalidInput("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.timeout_seconds))
            .connect(url)
            .await?;

        tracing::info!(
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self { pool })
    }

    /// Apply embedded migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn push_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &MediaFilter) {
    builder.push(" WHERE TRUE");
    if let Some(entity_type) = &filter.entity_type {
        builder.push(" AND entity_type = ").push_bind(entity_type.clone());
    }
    if let Some(entity_id) = &filter.entity_id {
        builder.push(" AND entity_id = ").push_bind(entity_id.clone());
    }
    if let Some(field_name) = &filter.field_name {
        builder.push(" AND field_name = ").push_bind(field_name.clone());
    }
    if let Some(uploaded_by) = &filter.uploaded_by {
        builder.push(" AND uploaded_by = ").push_bind(uploaded_by.clone());
    }
    if let Some(media_type) = filter.media_type {
        builder.push(" AND media_type = ").push_bind(media_type.as_str());
    }
    if let Some(is_active) = filter.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
}

fn select_query(
    filter: &MediaFilter,
    skip: u64,
    limit: Option<u64>,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM media", MEDIA_COLUMNS));
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY created_at DESC, id DESC");
    if let Some(limit) = limit {
        builder.push(" LIMIT ").push_bind(limit as i64);
    }
    if skip > 0 {
        builder.push(" OFFSET ").push_bind(i64::try_from(skip).unwrap_or(i64::MAX));
    }
    builder
}

fn count_query(filter: &MediaFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM media");
    push_filter(&mut builder, filter);
    builder
}

fn by_id_sql(visibility: Visibility, many: bool) -> String {
    let predicate = if many { "id = ANY($1)" } else { "id = $1" };
    match visibility {
        Visibility::Active => format!(
            "SELECT {} FROM media WHERE {} AND is_active = TRUE",
            MEDIA_COLUMNS, predicate
        ),
        Visibility::Any => format!("SELECT {} FROM media WHERE {}", MEDIA_COLUMNS, predicate),
    }
}

fn rows_into_records(rows: Vec<MediaRow>) -> AppResult<Vec<MediaRecord>> {
    rows.into_iter().map(MediaRow::into_record).collect()
}

#[async_trait]
impl MediaStore for PgMediaStore {
    #[tracing::instrument(skip(self, record), fields(db.table = "media", db.operation = "insert"))]
    async fn create(&self, record: NewMediaRecord) -> AppResult<MediaRecord> {
        let sql = format!(
            r#"
            INSERT INTO media (
                id, file_name, url, thumbnail_url, thumbnail_width, thumbnail_height,
                media_type, metadata, entity_type, entity_id, field_name, uploaded_by,
                storage_provider, storage_path, is_processed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        );

        let row: MediaRow = sqlx::query_as::<Postgres, MediaRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&record.file_name)
            .bind(&record.url)
            .bind(&record.thumbnail.url)
            .bind(record.thumbnail.width as i32)
            .bind(record.thumbnail.height as i32)
            .bind(record.media_type.as_str())
            .bind(Json(&record.metadata))
            .bind(&record.placement.entity_type)
            .bind(&record.placement.entity_id)
            .bind(&record.placement.field_name)
            .bind(&record.uploaded_by)
            .bind(record.storage_provider.as_str())
            .bind(&record.storage_path)
            .bind(record.is_processed)
            .fetch_one(&self.pool)
            .await?;

        row.into_record()
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %id))]
    async fn find_by_id(
        &self,
        id: Uuid,
        visibility: Visibility,
    ) -> AppResult<Option<MediaRecord>> {
        let row: Option<MediaRow> =
            sqlx::query_as::<Postgres, MediaRow>(&by_id_sql(visibility, false))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(MediaRow::into_record).transpose()
    }

    #[tracing::instrument(skip(self, ids), fields(db.table = "media", db.operation = "select", db.batch_size = ids.len()))]
    async fn find_by_ids(
        &self,
        ids: &[Uuid],
        visibility: Visibility,
    ) -> AppResult<Vec<MediaRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<MediaRow> =
            sqlx::query_as::<Postgres, MediaRow>(&by_id_sql(visibility, true))
                .bind(ids.to_vec())
                .fetch_all(&self.pool)
                .await?;

        rows_into_records(rows)
    }

    #[tracing::instrument(skip(self, filter), fields(db.table = "media", db.operation = "select"))]
    async fn find(
        &self,
        filter: &MediaFilter,
        skip: u64,
        limit: Option<u64>,
    ) -> AppResult<Vec<MediaRecord>> {
        let mut builder = select_query(filter, skip, limit);
        let rows: Vec<MediaRow> = builder
            .build_query_as::<MediaRow>()
            .fetch_all(&self.pool)
            .await?;

        rows_into_records(rows)
    }

    #[tracing::instrument(skip(self, filter), fields(db.table = "media", db.operation = "count"))]
    async fn count(&self, filter: &MediaFilter) -> AppResult<u64> {
        let mut builder = count_query(filter);
        let (count,): (i64,) = builder
            .build_query_as::<(i64,)>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "update", db.record_id = %id))]
    async fn update_by_id(&self, id: Uuid, patch: &MediaPatch) -> AppResult<Option<MediaRecord>> {
        if patch.is_empty() {
            return self.find_by_id(id, Visibility::Any).await;
        }

        let sql = format!(
            r#"
            UPDATE media
            SET is_active = COALESCE($2, is_active),
                is_processed = COALESCE($3, is_processed),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        );

        let row: Option<MediaRow> = sqlx::query_as::<Postgres, MediaRow>(&sql)
            .bind(id)
            .bind(patch.is_active)
            .bind(patch.is_processed)
            .fetch_optional(&self.pool)
            .await?;

        row.map(MediaRow::into_record).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete", db.record_id = %id))]
    async fn delete_by_id(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, ids), fields(db.table = "media", db.operation = "update", db.batch_size = ids.len()))]
    async fn update_many(&self, ids: &[Uuid], patch: &MediaPatch) -> AppResult<u64> {
        if ids.is_empty() || patch.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE media
            SET is_active = COALESCE($2, is_active),
                is_processed = COALESCE($3, is_processed),
                updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids.to_vec())
        .bind(patch.is_active)
        .bind(patch.is_processed)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self, ids), fields(db.table = "media", db.operation = "delete", db.batch_size = ids.len()))]
    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM media WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
