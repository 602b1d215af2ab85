//! Mediakit Core Library
//!
//! Domain models, error types and configuration shared by every mediakit crate.
//! Nothing in here performs I/O apart from reading the process environment in
//! [`Config::from_env`].

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{
    Config, DatabaseConfig, ImageConfig, PipelineConfig, StorageConfig, ValidationConfig,
};
pub use error::{AppError, AppResult, ErrorMetadata, LogLevel};
pub use storage_types::StorageProvider;
