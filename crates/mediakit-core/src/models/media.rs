use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::storage_types::StorageProvider;

/// Media type, derived from the upload's declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Document,
}

impl MediaType {
    /// Classify a MIME type by its top-level prefix.
    ///
    /// `image/*` and `video/*` map directly; `application/*` and `text/*` are documents.
    /// Anything else has no media type.
    pub fn from_content_type(content_type: &str) -> Option<MediaType> {
        let normalized = content_type.trim().to_ascii_lowercase();
        let prefix = normalized.split('/').next().unwrap_or_default();
        match prefix {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            "application" | "text" => Some(MediaType::Document),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Document => "document",
        }
    }
}

impl FromStr for MediaType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "document" => Ok(MediaType::Document),
            _ => Err(anyhow::anyhow!("Invalid media type: {}", s)),
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// The logical owner a media asset is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub entity_type: String,
    pub entity_id: String,
    pub field_name: String,
}

impl Placement {
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            field_name: field_name.into(),
        }
    }
}

/// Thumbnail rendition reference. All-empty for non-image media.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Upload metadata persisted with every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// Seconds; only set for video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// The persisted media record.
///
/// Field names (camelCase on the wire) are a durable contract with other services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: Uuid,
    pub file_name: String,
    pub url: String,
    pub thumbnail: Thumbnail,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub metadata: MediaMetadata,
    pub placement: Placement,
    pub uploaded_by: String,
    pub storage_provider: StorageProvider,
    pub storage_path: String,
    pub is_processed: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaRecord {
    pub fn has_thumbnail(&self) -> bool {
        !self.thumbnail.is_empty()
    }
}

/// A record about to be created. Identity and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMediaRecord {
    pub file_name: String,
    pub url: String,
    pub thumbnail: Thumbnail,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub metadata: MediaMetadata,
    pub placement: Placement,
    pub uploaded_by: String,
    pub storage_provider: StorageProvider,
    pub storage_path: String,
    pub is_processed: bool,
}

impl NewMediaRecord {
    /// Materialize the record as the store will persist it.
    pub fn into_record(self, id: Uuid, now: DateTime<Utc>) -> MediaRecord {
        MediaRecord {
            id,
            file_name: self.file_name,
            url: self.url,
            thumbnail: self.thumbnail,
            media_type: self.media_type,
            metadata: self.metadata,
            placement: self.placement,
            uploaded_by: self.uploaded_by,
            storage_provider: self.storage_provider,
            storage_path: self.storage_path,
            is_processed: self.is_processed,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_content_type() {
        assert_eq!(
            MediaType::from_content_type("image/jpeg"),
            Some(MediaType::Image)
        );
        assert_eq!(
            MediaType::from_content_type("VIDEO/MP4"),
            Some(MediaType::Video)
        );
        assert_eq!(
            MediaType::from_content_type("application/pdf"),
            Some(MediaType::Document)
        );
        assert_eq!(
            MediaType::from_content_type("text/plain"),
            Some(MediaType::Document)
        );
        assert_eq!(MediaType::from_content_type("audio/mpeg"), None);
        assert_eq!(MediaType::from_content_type(""), None);
    }

    #[test]
    fn test_record_serializes_with_contract_field_names() {
        let record = NewMediaRecord {
            file_name: "1700000000000-abcd1234.pdf".to_string(),
            url: "http://localhost/a.pdf".to_string(),
            thumbnail: Thumbnail::default(),
            media_type: MediaType::Document,
            metadata: MediaMetadata {
                original_name: "a.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                size: 10,
                dimensions: None,
                duration: None,
                format: None,
            },
            placement: Placement::new("user", "42", "resume"),
            uploaded_by: "user-42".to_string(),
            storage_provider: StorageProvider::LocalDisk,
            storage_path: "user/42/resume/1700000000000-abcd1234.pdf".to_string(),
            is_processed: false,
        }
        .into_record(Uuid::new_v4(), Utc::now());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "document");
        assert_eq!(json["fileName"], "1700000000000-abcd1234.pdf");
        assert_eq!(json["storageProvider"], "local-disk");
        assert_eq!(json["placement"]["entityType"], "user");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["thumbnail"]["url"], "");
        assert!(json["metadata"].get("dimensions").is_none());
    }
}
