//! Mediakit Services Layer
//!
//! [`MediaService`] composes the validator, image transformer, storage backend and
//! media repository into the upload, query and lifecycle operations callers use.
//! Transport layers (HTTP, CLI) depend on this crate alone.

pub mod media;
pub mod naming;

pub use media::{MediaService, UploadFile};
pub use mediakit_db::{MediaRepository, MediaStore, MemoryMediaStore, PgMediaStore};
pub use mediakit_processing::{ImageTransformer, MediaValidator, OutputFormat, VideoProbe};
pub use mediakit_storage::{create_storage, Storage, StorageError, StorageResult};
