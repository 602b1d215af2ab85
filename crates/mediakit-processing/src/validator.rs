use mediakit_core::{AppError, ValidationConfig};

/// Rejection reasons produced by [`MediaValidator`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unsupported content type: {content_type}")]
    UnsupportedType { content_type: String },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnsupportedType { content_type } => {
                AppError::UnsupportedType(content_type)
            }
            ValidationError::TooLarge { size, max } => AppError::PayloadTooLarge { size, max },
        }
    }
}

/// Media file validator
///
/// Checks the declared content type against the union of the configured
/// image/video/document allow-lists, and the size against the ceiling.
/// Pure: no I/O, no side effects.
#[derive(Debug, Clone)]
pub struct MediaValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl MediaValidator {
    pub fn new(max_file_size: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| normalize_content_type(&ct))
                .collect(),
        }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        let allowed = config
            .allowed_image_types
            .iter()
            .chain(&config.allowed_video_types)
            .chain(&config.allowed_document_types)
            .cloned()
            .collect();
        Self::new(config.max_file_size_bytes, allowed)
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate content type
    ///
    /// Parameters such as `; charset=utf-8` are ignored for the comparison.
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = normalize_content_type(content_type);

        if normalized.is_empty() || !self.allowed_content_types.contains(&normalized) {
            return Err(ValidationError::UnsupportedType {
                content_type: content_type.to_string(),
            });
        }

        Ok(())
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::TooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate all aspects of a file. The content type is checked first.
    pub fn validate(&self, content_type: &str, size: usize) -> Result<(), ValidationError> {
        self.validate_content_type(content_type)?;
        self.validate_file_size(size)?;
        Ok(())
    }
}

/// Lowercased MIME essence without parameters.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> MediaValidator {
        MediaValidator::from_config(&ValidationConfig::default())
    }

    #[test]
    fn test_accepts_allowed_types_from_every_list() {
        let v = validator();
        assert!(v.validate("image/png", 1024).is_ok());
        assert!(v.validate("video/mp4", 1024).is_ok());
        assert!(v.validate("application/pdf", 1024).is_ok());
        assert!(v.validate("Text/Plain; charset=utf-8", 10).is_ok());
    }

    #[test]
    fn test_rejects_unknown_type() {
        let err = validator()
            .validate("application/x-unknown", 10)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedType {
                content_type: "application/x-unknown".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_oversized_file() {
        let v = MediaValidator::new(100, vec!["image/png".to_string()]);
        assert!(v.validate("image/png", 100).is_ok());
        assert_eq!(
            v.validate("image/png", 101),
            Err(ValidationError::TooLarge { size: 101, max: 100 })
        );
    }

    #[test]
    fn test_type_checked_before_size() {
        let v = MediaValidator::new(100, vec!["image/png".to_string()]);
        assert!(matches!(
            v.validate("audio/mpeg", 1_000),
            Err(ValidationError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_converts_into_app_error() {
        let err: AppError = ValidationError::TooLarge { size: 2, max: 1 }.into();
        assert!(matches!(err, AppError::PayloadTooLarge { size: 2, max: 1 }));
    }
}
