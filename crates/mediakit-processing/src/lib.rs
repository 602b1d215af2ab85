//! Mediakit Processing Library
//!
//! Upload validation, image normalization and thumbnailing, and video probing.
//! Everything here is a pure transform over byte buffers: nothing is persisted.
//!
//! Image work is CPU-bound and synchronous; async callers should run it on
//! the blocking pool (`tokio::task::spawn_blocking`).

#[cfg(feature = "image")]
pub mod compression;
pub mod error;
#[cfg(feature = "image")]
pub mod image;
pub mod metadata;
pub mod validator;
#[cfg(feature = "video")]
pub mod video;

// Re-export commonly used types
#[cfg(feature = "image")]
pub use compression::{ImageEncoder, OutputFormat};
pub use error::ProcessingError;
#[cfg(feature = "image")]
pub use self::image::{ImageResize, ImageTransformer, Rendition};
pub use metadata::{ImageInfo, VideoMetadata};
pub use validator::{MediaValidator, ValidationError};
#[cfg(feature = "video")]
pub use video::VideoProbe;
