#[cfg(feature = "storage-cdn")]
use crate::CdnStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageError, StorageProvider, StorageResult};
use mediakit_core::StorageConfig;
use std::sync::Arc;

/// Create the storage backend selected by configuration.
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    tracing::info!(backend = %config.backend, "Initializing storage backend");

    match config.backend {
        #[cfg(feature = "storage-s3")]
        StorageProvider::ObjectStore => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(bucket, region, config.s3_endpoint.clone())?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageProvider::ObjectStore => Err(StorageError::ConfigError(
            "Object-store backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-cdn")]
        StorageProvider::CdnStore => {
            let zone = config.cdn_zone.clone().ok_or_else(|| {
                StorageError::ConfigError("CDN_STORAGE_ZONE not configured".to_string())
            })?;
            let access_key = config.cdn_access_key.clone().ok_or_else(|| {
                StorageError::ConfigError("CDN_ACCESS_KEY not configured".to_string())
            })?;
            let public_url = config.cdn_public_url.clone().ok_or_else(|| {
                StorageError::ConfigError("CDN_PUBLIC_URL not configured".to_string())
            })?;

            let storage = CdnStorage::new(
                config.cdn_endpoint.clone(),
                zone,
                access_key,
                public_url,
                config.cdn_token_key.clone(),
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-cdn"))]
        StorageProvider::CdnStore => Err(StorageError::ConfigError(
            "CDN backend not available (storage-cdn feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageProvider::LocalDisk => {
            let storage =
                LocalStorage::new(config.local_path.clone(), config.local_base_url.clone()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageProvider::LocalDisk => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local", feature = "storage-cdn"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_creates_local_backend() {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            local_path: dir.path().to_string_lossy().to_string(),
            local_base_url: "http://localhost:3000/media".to_string(),
            ..StorageConfig::default()
        };

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageProvider::LocalDisk);
    }

    #[tokio::test]
    async fn test_cdn_backend_requires_zone() {
        let config = StorageConfig {
            backend: StorageProvider::CdnStore,
            ..StorageConfig::default()
        };

        let result = create_storage(&config).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_creates_cdn_backend() {
        let config = StorageConfig {
            backend: StorageProvider::CdnStore,
            cdn_zone: Some("zone".to_string()),
            cdn_access_key: Some("key".to_string()),
            cdn_public_url: Some("https://media.b-cdn.net".to_string()),
            ..StorageConfig::default()
        };

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageProvider::CdnStore);
    }
}
