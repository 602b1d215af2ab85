//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageProvider;
use async_trait::async_trait;
use futures::{stream, StreamExt};
use mediakit_core::AppError;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on concurrent requests issued by the default `delete_many`.
pub const DELETE_CONCURRENCY: usize = 8;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Name of the storage operation class this error came from.
    pub fn operation(&self) -> &'static str {
        match self {
            StorageError::UploadFailed(_) => "upload",
            StorageError::DownloadFailed(_) | StorageError::NotFound(_) => "download",
            StorageError::DeleteFailed(_) => "delete",
            StorageError::InvalidKey(_) => "resolve_key",
            StorageError::BackendError(_) => "backend",
            StorageError::IoError(_) => "io",
            StorageError::ConfigError(_) => "configure",
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(message) => AppError::InvalidInput(message),
            err => AppError::storage(err.operation(), err),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Location of an object after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub key: String,
}

/// Storage abstraction trait
///
/// All storage backends (object store, CDN zone, local filesystem) implement this
/// trait, so the pipeline never branches on the concrete backend.
///
/// **Key format:** see the crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a buffer under `key`, replacing any existing object.
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<StoredObject>;

    /// Download an object by its storage key
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete an object. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Delete a batch of objects.
    ///
    /// An empty batch is a no-op. The default issues concurrent single deletes and
    /// reports the first failure after all of them have been attempted.
    async fn delete_many(&self, keys: &[String]) -> StorageResult<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let results: Vec<StorageResult<()>> = stream::iter(keys.to_vec())
            .map(|key| async move { self.delete(&key).await })
            .buffer_unordered(DELETE_CONCURRENCY)
            .collect()
            .await;

        results.into_iter().collect()
    }

    /// Generate a time-bounded URL for direct access (GET).
    ///
    /// Backends without native expiry return their stable public URL, so the TTL
    /// is advisory for them.
    async fn signed_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Public URL of an object, without any access token.
    fn public_url(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageProvider;
}
