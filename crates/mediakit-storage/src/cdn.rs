//! CDN storage zone backend.
//!
//! Objects are written through the zone's HTTP storage API
//! (`PUT/DELETE/HEAD {endpoint}/{zone}/{key}` with an `AccessKey` header) and
//! served from the zone's pull URL. Signed URLs use token authentication:
//! `token = base64url(sha256(token_key + "/" + key + expires))`.

use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageProvider;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use reqwest::{Client, StatusCode, Url};
use sha2::{Digest, Sha256};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct CdnStorage {
    http_client: Client,
    endpoint: Url,
    zone: String,
    access_key: String,
    public_url: Url,
    token_key: Option<String>,
}

impl CdnStorage {
    /// Create a new CdnStorage instance
    ///
    /// # Arguments
    /// * `endpoint` - Storage API base (e.g., "https://storage.bunnycdn.com")
    /// * `zone` - Storage zone name
    /// * `access_key` - Storage zone password, sent as the `AccessKey` header
    /// * `public_url` - Pull zone base URL objects are served from
    /// * `token_key` - URL token authentication key; `None` disables signing
    pub fn new(
        endpoint: String,
        zone: String,
        access_key: String,
        public_url: String,
        token_key: Option<String>,
    ) -> StorageResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(CdnStorage {
            http_client,
            endpoint: parse_base_url("endpoint", &endpoint)?,
            zone,
            access_key,
            public_url: parse_base_url("public URL", &public_url)?,
            token_key: token_key.filter(|k| !k.is_empty()),
        })
    }

    fn object_url(&self, key: &str) -> String {
        join_key(&self.endpoint, Some(&self.zone), key)
    }

    fn generate_url(&self, key: &str) -> String {
        join_key(&self.public_url, None, key)
    }

    /// Build a token-authenticated URL that expires at `expires_at` (unix seconds).
    fn sign(&self, key: &str, token_key: &str, expires_at: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token_key.as_bytes());
        hasher.update(b"/");
        hasher.update(key.as_bytes());
        hasher.update(expires_at.to_string().as_bytes());
        let token = URL_SAFE_NO_PAD.encode(hasher.finalize());

        format!(
            "{}?token={}&expires={}",
            self.generate_url(key),
            token,
            expires_at
        )
    }
}

fn parse_base_url(name: &str, value: &str) -> StorageResult<Url> {
    let url = Url::parse(value)
        .map_err(|e| StorageError::ConfigError(format!("Invalid CDN {} '{}': {}", name, value, e)))?;
    if url.cannot_be_a_base() {
        return Err(StorageError::ConfigError(format!(
            "CDN {} '{}' cannot carry a path",
            name, value
        )));
    }
    Ok(url)
}

/// Append the key's segments to `base`, percent-encoding each one so no key
/// character can end the path early.
fn join_key(base: &Url, zone: Option<&str>, key: &str) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty();
        if let Some(zone) = zone {
            segments.push(zone);
        }
        segments.extend(key.split('/'));
    }
    url.into()
}

#[async_trait]
impl Storage for CdnStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        let size = data.len();
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .put(self.object_url(key))
            .header("AccessKey", &self.access_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    zone = %self.zone,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "CDN upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                zone = %self.zone,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "CDN upload rejected"
            );
            return Err(StorageError::UploadFailed(format!(
                "CDN storage returned status {}",
                status
            )));
        }

        tracing::info!(
            zone = %self.zone,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "CDN upload successful"
        );

        Ok(StoredObject {
            url: self.generate_url(key),
            key: key.to_string(),
        })
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let response = self
            .http_client
            .get(self.object_url(key))
            .header("AccessKey", &self.access_key)
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(key.to_string())),
            status if status.is_success() => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;
                Ok(bytes.to_vec())
            }
            status => Err(StorageError::DownloadFailed(format!(
                "CDN storage returned status {}",
                status
            ))),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .delete(self.object_url(key))
            .header("AccessKey", &self.access_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    zone = %self.zone,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "CDN delete failed"
                );
                StorageError::DeleteFailed(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::NOT_FOUND && !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                zone = %self.zone,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "CDN delete rejected"
            );
            return Err(StorageError::DeleteFailed(format!(
                "CDN storage returned status {}",
                status
            )));
        }

        tracing::info!(
            zone = %self.zone,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "CDN delete successful"
        );

        Ok(())
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let Some(token_key) = self.token_key.as_deref() else {
            return Ok(self.generate_url(key));
        };

        let expires_at = chrono::Utc::now().timestamp() + expires_in.as_secs() as i64;
        Ok(self.sign(key, token_key, expires_at))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let response = self
            .http_client
            .head(self.object_url(key))
            .header("AccessKey", &self.access_key)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(StorageError::BackendError(format!(
                "CDN storage returned status {}",
                status
            ))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        self.generate_url(key)
    }

    fn backend_type(&self) -> StorageProvider {
        StorageProvider::CdnStore
    }
}
