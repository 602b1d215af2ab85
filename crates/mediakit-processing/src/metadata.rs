use serde::{Deserialize, Serialize};

/// Dimensions and encoding of an image buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Lowercase format name, e.g. `jpeg`
    pub format: String,
    pub size: u64,
}

/// Result of probing a video container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Seconds, when the container reports it
    pub duration: Option<f64>,
    pub width: u32,
    pub height: u32,
    pub codec: String,
}
