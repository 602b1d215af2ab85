//! Mediakit Storage Library
//!
//! The [`Storage`] capability trait and its three backends: an S3-compatible
//! object store, a CDN storage zone and the local filesystem. Exactly one backend
//! is active per deployment; [`create_storage`] picks it from configuration.
//!
//! # Storage key format
//!
//! Every backend uses the same key layout:
//!
//! - **Primary object**: `{entityType}/{entityId}/{fieldName}/{fileName}`
//! - **Thumbnail**: `{entityType}/{entityId}/{fieldName}/thumbnails/{fileName}`
//!
//! Keys must not contain `..` or a leading `/`. Key derivation lives in the
//! [`keys`] module so all backends stay consistent.

#[cfg(feature = "storage-cdn")]
pub mod cdn;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-cdn")]
pub use cdn::CdnStorage;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use mediakit_core::StorageProvider;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
