#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use mediakit_core::models::Placement;
use mediakit_core::PipelineConfig;
use mediakit_db::{MediaRepository, MemoryMediaStore};
use mediakit_processing::{ImageTransformer, MediaValidator, OutputFormat};
use mediakit_services::{MediaService, UploadFile};
use mediakit_storage::{
    LocalStorage, Storage, StorageError, StorageProvider, StorageResult, StoredObject,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const BASE_URL: &str = "http://localhost:3000/media";
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Local-disk storage whose writes and deletes can be made to fail or stall.
pub struct FaultyStorage {
    inner: LocalStorage,
    fail_thumbnail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    upload_delay_ms: AtomicU64,
}

impl FaultyStorage {
    fn new(inner: LocalStorage) -> Self {
        Self {
            inner,
            fail_thumbnail_uploads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            upload_delay_ms: AtomicU64::new(0),
        }
    }

    pub fn fail_thumbnail_uploads(&self) {
        self.fail_thumbnail_uploads.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn delay_uploads(&self, delay: Duration) {
        self.upload_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for FaultyStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        let delay = self.upload_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_thumbnail_uploads.load(Ordering::SeqCst) && key.contains("/thumbnails/") {
            return Err(StorageError::UploadFailed(format!("bucket rejected {}", key)));
        }
        self.inner.upload(key, data, content_type).await
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.download(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(format!("bucket rejected {}", key)));
        }
        self.inner.delete(key).await
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        self.inner.signed_url(key, expires_in).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }

    fn backend_type(&self) -> StorageProvider {
        self.inner.backend_type()
    }
}

pub struct TestContext {
    pub service: MediaService,
    pub storage: Arc<dyn Storage>,
    pub faults: Arc<FaultyStorage>,
    pub store: Arc<MemoryMediaStore>,
    pub root: TempDir,
}

impl TestContext {
    /// Whether the storage directory holds any file at all.
    pub fn has_stored_files(&self) -> bool {
        fn walk(dir: &std::path::Path) -> bool {
            std::fs::read_dir(dir)
                .map(|entries| {
                    entries.flatten().any(|entry| {
                        let path = entry.path();
                        if path.is_dir() {
                            walk(&path)
                        } else {
                            true
                        }
                    })
                })
                .unwrap_or(false)
        }
        walk(self.root.path())
    }
}

pub fn allowed_types() -> Vec<String> {
    [
        "image/jpeg",
        "image/png",
        "video/mp4",
        "application/pdf",
        "text/plain",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Service over an in-memory store and local-disk storage in a temp dir.
pub async fn setup() -> TestContext {
    setup_with(ImageTransformer::new(1920, 1080, OutputFormat::Jpeg, 80, 60)).await
}

pub async fn setup_with(transformer: ImageTransformer) -> TestContext {
    build(transformer, PipelineConfig::default()).await
}

/// Like [`setup`], with every operation bounded to `seconds`.
pub async fn setup_with_timeout(seconds: u64) -> TestContext {
    let pipeline = PipelineConfig {
        operation_timeout_secs: seconds,
        ..PipelineConfig::default()
    };
    build(
        ImageTransformer::new(1920, 1080, OutputFormat::Jpeg, 80, 60),
        pipeline,
    )
    .await
}

async fn build(transformer: ImageTransformer, pipeline: PipelineConfig) -> TestContext {
    let root = TempDir::new().unwrap();
    let local = LocalStorage::new(root.path(), BASE_URL.to_string())
        .await
        .unwrap();
    let faults = Arc::new(FaultyStorage::new(local));
    let storage: Arc<dyn Storage> = faults.clone();
    let store = Arc::new(MemoryMediaStore::new());
    let repository = MediaRepository::new(store.clone());
    let validator = MediaValidator::new(MAX_FILE_SIZE, allowed_types());

    let service = MediaService::new(repository, storage.clone(), validator, transformer)
        .with_pipeline(&pipeline)
        .with_thumbnail_size(100, 100);

    TestContext {
        service,
        storage,
        faults,
        store,
        root,
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 200])
    }));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

pub fn image_upload(width: u32, height: u32) -> UploadFile {
    UploadFile::new(png_bytes(width, height), "photo.png", "image/png")
}

pub fn pdf_upload() -> UploadFile {
    UploadFile::new(b"%PDF-1.4 minimal".to_vec(), "Lease Agreement.pdf", "application/pdf")
}

pub fn avatar() -> Placement {
    Placement::new("user", "42", "avatar")
}

pub fn documents() -> Placement {
    Placement::new("property", "p-7", "documents")
}
