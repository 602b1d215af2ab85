use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend variants.
///
/// Exactly one is active per deployment. The variant that persisted a record is
/// written into the record itself and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageProvider {
    ObjectStore,
    CdnStore,
    LocalDisk,
}

impl StorageProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageProvider::ObjectStore => "object-store",
            StorageProvider::CdnStore => "cdn-store",
            StorageProvider::LocalDisk => "local-disk",
        }
    }
}

impl FromStr for StorageProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "object-store" | "s3" => Ok(StorageProvider::ObjectStore),
            "cdn-store" | "cdn" => Ok(StorageProvider::CdnStore),
            "local-disk" | "local" => Ok(StorageProvider::LocalDisk),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
