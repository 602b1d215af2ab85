use mediakit_core::AppError;

/// Failures of the pure transform layer.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Video probe failed: {0}")]
    Probe(String),

    #[error("Invalid processing configuration: {0}")]
    Config(String),
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            // Undecodable bytes are a malformed upload, not a server fault.
            ProcessingError::Decode(message) => AppError::DecodeFailed(message),
            other => AppError::Internal(other.to_string()),
        }
    }
}
