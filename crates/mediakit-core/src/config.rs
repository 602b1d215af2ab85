//! Configuration module
//!
//! The whole pipeline is configured from the process environment once at startup.
//! A `.env` file is honored through `dotenvy`. Numeric values that fail to parse
//! fall back to their defaults; values required by the selected storage backend
//! are checked by [`Config::validate`].

use std::env;
use std::str::FromStr;

use crate::storage_types::StorageProvider;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_FILE_SIZE_MB: usize = 10;
const IMAGE_MAX_WIDTH: u32 = 1920;
const IMAGE_MAX_HEIGHT: u32 = 1080;
const IMAGE_QUALITY: u8 = 80;
const THUMBNAIL_SIZE: u32 = 300;
const THUMBNAIL_QUALITY: u8 = 60;
const UPLOAD_CONCURRENCY: usize = 4;
const OPERATION_TIMEOUT_SECS: u64 = 60;
const SIGNED_URL_TTL_SECS: u64 = 3600;

const DEFAULT_IMAGE_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp";
const DEFAULT_VIDEO_TYPES: &str = "video/mp4,video/quicktime,video/webm";
const DEFAULT_DOCUMENT_TYPES: &str = "application/pdf,application/msword,application/vnd.openxmlformats-officedocument.wordprocessingml.document,text/plain";

pub const DEFAULT_CDN_STORAGE_ENDPOINT: &str = "https://storage.bunnycdn.com";
pub const DEFAULT_LOCAL_STORAGE_PATH: &str = "./uploads";
pub const DEFAULT_LOCAL_STORAGE_BASE_URL: &str = "http://localhost:4000/uploads";

const SUPPORTED_IMAGE_FORMATS: &[&str] = &["jpeg", "jpg", "png", "webp"];

/// Storage backend selection and per-backend settings.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageProvider,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, Spaces, ...)
    pub s3_endpoint: Option<String>,
    pub cdn_endpoint: String,
    pub cdn_zone: Option<String>,
    pub cdn_access_key: Option<String>,
    pub cdn_public_url: Option<String>,
    pub cdn_token_key: Option<String>,
    pub local_path: String,
    pub local_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageProvider::LocalDisk,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            cdn_endpoint: DEFAULT_CDN_STORAGE_ENDPOINT.to_string(),
            cdn_zone: None,
            cdn_access_key: None,
            cdn_public_url: None,
            cdn_token_key: None,
            local_path: DEFAULT_LOCAL_STORAGE_PATH.to_string(),
            local_base_url: DEFAULT_LOCAL_STORAGE_BASE_URL.to_string(),
        }
    }
}

/// Allow-lists and size ceiling for the file validator.
#[derive(Clone, Debug)]
pub struct ValidationConfig {
    pub max_file_size_bytes: usize,
    pub allowed_image_types: Vec<String>,
    pub allowed_video_types: Vec<String>,
    pub allowed_document_types: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_image_types: split_list(DEFAULT_IMAGE_TYPES),
            allowed_video_types: split_list(DEFAULT_VIDEO_TYPES),
            allowed_document_types: split_list(DEFAULT_DOCUMENT_TYPES),
        }
    }
}

/// Image normalization and thumbnail settings.
#[derive(Clone, Debug)]
pub struct ImageConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub format: String,
    pub quality: u8,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub thumbnail_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: IMAGE_MAX_WIDTH,
            max_height: IMAGE_MAX_HEIGHT,
            format: "jpeg".to_string(),
            quality: IMAGE_QUALITY,
            thumbnail_width: THUMBNAIL_SIZE,
            thumbnail_height: THUMBNAIL_SIZE,
            thumbnail_quality: THUMBNAIL_QUALITY,
        }
    }
}

/// Orchestrator resource bounds.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub upload_concurrency: usize,
    pub operation_timeout_secs: u64,
    pub signed_url_ttl_secs: u64,
    pub ffprobe_path: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            upload_concurrency: UPLOAD_CONCURRENCY,
            operation_timeout_secs: OPERATION_TIMEOUT_SECS,
            signed_url_ttl_secs: SIGNED_URL_TTL_SECS,
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: MAX_CONNECTIONS,
            timeout_seconds: CONNECTION_TIMEOUT_SECS,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub storage: StorageConfig,
    pub validation: ValidationConfig,
    pub image: ImageConfig,
    pub pipeline: PipelineConfig,
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            storage: StorageConfig::default(),
            validation: ValidationConfig::default(),
            image: ImageConfig::default(),
            pipeline: PipelineConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => StorageProvider::from_str(&value)?,
            Err(_) => StorageProvider::LocalDisk,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            cdn_endpoint: env::var("CDN_STORAGE_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_CDN_STORAGE_ENDPOINT.to_string()),
            cdn_zone: env::var("CDN_STORAGE_ZONE").ok(),
            cdn_access_key: env::var("CDN_ACCESS_KEY").ok(),
            cdn_public_url: env::var("CDN_PUBLIC_URL").ok(),
            cdn_token_key: env::var("CDN_TOKEN_KEY").ok(),
            local_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| DEFAULT_LOCAL_STORAGE_PATH.to_string()),
            local_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_LOCAL_STORAGE_BASE_URL.to_string()),
        };

        let max_file_size_mb = env_parse("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB);
        let validation = ValidationConfig {
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_image_types: env_list("ALLOWED_IMAGE_TYPES", DEFAULT_IMAGE_TYPES),
            allowed_video_types: env_list("ALLOWED_VIDEO_TYPES", DEFAULT_VIDEO_TYPES),
            allowed_document_types: env_list("ALLOWED_DOCUMENT_TYPES", DEFAULT_DOCUMENT_TYPES),
        };

        let image = ImageConfig {
            max_width: env_parse("IMAGE_MAX_WIDTH", IMAGE_MAX_WIDTH),
            max_height: env_parse("IMAGE_MAX_HEIGHT", IMAGE_MAX_HEIGHT),
            format: env::var("IMAGE_FORMAT")
                .unwrap_or_else(|_| "jpeg".to_string())
                .trim()
                .to_lowercase(),
            quality: env_parse("IMAGE_QUALITY", IMAGE_QUALITY),
            thumbnail_width: env_parse("THUMBNAIL_WIDTH", THUMBNAIL_SIZE),
            thumbnail_height: env_parse("THUMBNAIL_HEIGHT", THUMBNAIL_SIZE),
            thumbnail_quality: env_parse("THUMBNAIL_QUALITY", THUMBNAIL_QUALITY),
        };

        let pipeline = PipelineConfig {
            upload_concurrency: env_parse("UPLOAD_CONCURRENCY", UPLOAD_CONCURRENCY),
            operation_timeout_secs: env_parse("OPERATION_TIMEOUT_SECS", OPERATION_TIMEOUT_SECS),
            signed_url_ttl_secs: env_parse("SIGNED_URL_TTL_SECS", SIGNED_URL_TTL_SECS),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
        };

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").ok(),
            max_connections: env_parse("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
        };

        Ok(Config {
            environment,
            storage,
            validation,
            image,
            pipeline,
            database,
        })
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage.backend {
            StorageProvider::ObjectStore => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using the object-store backend"
                    ));
                }
                if self.storage.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using the object-store backend"
                    ));
                }
            }
            StorageProvider::CdnStore => {
                if self.storage.cdn_zone.is_none() {
                    return Err(anyhow::anyhow!(
                        "CDN_STORAGE_ZONE must be set when using the cdn-store backend"
                    ));
                }
                if self.storage.cdn_access_key.is_none() {
                    return Err(anyhow::anyhow!(
                        "CDN_ACCESS_KEY must be set when using the cdn-store backend"
                    ));
                }
                if self.storage.cdn_public_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "CDN_PUBLIC_URL must be set when using the cdn-store backend"
                    ));
                }
            }
            StorageProvider::LocalDisk => {
                if self.storage.local_path.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must not be empty when using the local-disk backend"
                    ));
                }
                if self.storage.local_base_url.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must not be empty when using the local-disk backend"
                    ));
                }
            }
        }

        if !SUPPORTED_IMAGE_FORMATS.contains(&self.image.format.as_str()) {
            return Err(anyhow::anyhow!(
                "IMAGE_FORMAT must be one of jpeg, png, webp (got '{}')",
                self.image.format
            ));
        }

        if self.image.max_width == 0 || self.image.max_height == 0 {
            return Err(anyhow::anyhow!(
                "IMAGE_MAX_WIDTH and IMAGE_MAX_HEIGHT must be positive"
            ));
        }

        if self.image.thumbnail_width == 0 || self.image.thumbnail_height == 0 {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_WIDTH and THUMBNAIL_HEIGHT must be positive"
            ));
        }

        if self.pipeline.upload_concurrency == 0 {
            return Err(anyhow::anyhow!("UPLOAD_CONCURRENCY must be at least 1"));
        }

        if let Some(url) = &self.database.url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when unset or malformed.
fn env_parse<T: FromStr + ToString>(key: &str, default: T) -> T {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .unwrap_or(default)
}

fn env_list(key: &str, default: &str) -> Vec<String> {
    split_list(&env::var(key).unwrap_or_else(|_| default.to_string()))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.validation.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.pipeline.signed_url_ttl_secs, 3600);
        assert!(!config.is_production());
    }

    #[test]
    fn test_object_store_requires_bucket_and_region() {
        let mut config = Config::default();
        config.storage.backend = StorageProvider::ObjectStore;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("S3_BUCKET"));

        config.storage.s3_bucket = Some("media".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("S3_REGION"));

        config.storage.s3_region = Some("eu-west-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cdn_store_requires_zone_key_and_public_url() {
        let mut config = Config::default();
        config.storage.backend = StorageProvider::CdnStore;
        assert!(config.validate().is_err());

        config.storage.cdn_zone = Some("zone".to_string());
        config.storage.cdn_access_key = Some("secret".to_string());
        assert!(config.validate().is_err());

        config.storage.cdn_public_url = Some("https://cdn.example.com".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_image_format() {
        let mut config = Config::default();
        config.image.format = "tiff".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_postgres_database_url() {
        let mut config = Config::default();
        config.database.url = Some("mysql://localhost/media".to_string());
        assert!(config.validate().is_err());

        config.database.url = Some("postgres://localhost/media".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_split_list_normalizes_entries() {
        assert_eq!(
            split_list(" Image/PNG, ,image/jpeg "),
            vec!["image/png".to_string(), "image/jpeg".to_string()]
        );
    }

    #[test]
    fn test_env_parse_falls_back_on_missing_key() {
        assert_eq!(env_parse("MEDIAKIT_TEST_UNSET_VARIABLE", 42u32), 42);
    }
}
