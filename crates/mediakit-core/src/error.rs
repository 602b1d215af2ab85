//! Error types module
//!
//! Every failure the media pipeline can surface is an [`AppError`]. Variants map onto
//! four classes: user input (unsupported type, too large, undecodable bytes, bad
//! placement), missing records, storage/database failures, and internal errors.
//!
//! The `Database` variant wraps `sqlx::Error` when the `sqlx` feature is enabled.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like timeouts
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// by whatever transport sits on top of the pipeline.
pub trait ErrorMetadata {
    /// HTTP-equivalent status code
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UNSUPPORTED_TYPE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Failed to decode upload: {0}")]
    DecodeFailed(String),

    #[error("Storage operation '{operation}' failed: {message}")]
    StorageFailed { operation: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Operation '{operation}' timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias used across the workspace.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        if let SqlxError::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return AppError::Conflict(db_err.message().to_string());
            }
        }
        AppError::Database(err)
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl AppError {
    /// Build a storage failure tagged with the operation that produced it.
    pub fn storage(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        AppError::StorageFailed {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    /// Whether this error was caused by the caller's input rather than the system.
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }

    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::UnsupportedType(_) => "UnsupportedType",
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::DecodeFailed(_) => "DecodeFailed",
            AppError::StorageFailed { .. } => "StorageFailed",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Conflict(_) => "Conflict",
            AppError::Database(_) => "Database",
            AppError::Timeout { .. } => "Timeout",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::UnsupportedType(_) => (415, "UNSUPPORTED_TYPE", false, false, LogLevel::Debug),
        AppError::PayloadTooLarge { .. } => {
            (413, "PAYLOAD_TOO_LARGE", false, false, LogLevel::Debug)
        }
        AppError::DecodeFailed(_) => (400, "DECODE_FAILED", false, false, LogLevel::Warn),
        AppError::StorageFailed { .. } => (502, "STORAGE_FAILED", true, true, LogLevel::Error),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, false, LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::Conflict(_) => (409, "CONFLICT", true, false, LogLevel::Warn),
        AppError::Database(_) => (500, "DATABASE_ERROR", true, true, LogLevel::Error),
        AppError::Timeout { .. } => (504, "TIMEOUT", true, false, LogLevel::Warn),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::StorageFailed { .. } => "Failed to access storage".to_string(),
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            // Validation-class errors are surfaced verbatim.
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_unsupported_type() {
        let err = AppError::UnsupportedType("application/x-unknown".to_string());
        assert_eq!(err.http_status_code(), 415);
        assert_eq!(err.error_code(), "UNSUPPORTED_TYPE");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("application/x-unknown"));
        assert!(err.is_client_error());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_too_large() {
        let err = AppError::PayloadTooLarge {
            size: 2048,
            max: 1024,
        };
        assert_eq!(err.http_status_code(), 413);
        assert!(err.client_message().contains("2048"));
        assert!(err.client_message().contains("1024"));
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_storage_failure_is_hidden_from_clients() {
        let err = AppError::storage("upload", "connection reset by peer");
        assert_eq!(err.http_status_code(), 502);
        assert!(err.is_sensitive());
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access storage");
        assert!(err.to_string().contains("upload"));
        assert!(err.to_string().contains("connection reset"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Media not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.client_message(), "Not found: Media not found");
        assert_eq!(err.error_type(), "NotFound");
    }

    #[test]
    fn test_detailed_message_without_source() {
        let err = AppError::Internal("boom".to_string());
        assert_eq!(err.detailed_message(), "Internal error: boom");
    }
}
