use super::resize::ImageResize;
use crate::compression::{ImageEncoder, OutputFormat};
use crate::error::ProcessingError;
use crate::metadata::ImageInfo;
use image::{DynamicImage, GenericImageView, ImageReader};
use mediakit_core::ImageConfig;
use std::io::Cursor;

/// An encoded rendition and its probed properties.
#[derive(Debug, Clone)]
pub struct Rendition {
    pub data: Vec<u8>,
    pub info: ImageInfo,
}

/// Produces the primary rendition and thumbnail of an uploaded image.
///
/// All methods are synchronous and CPU-bound.
#[derive(Debug, Clone)]
pub struct ImageTransformer {
    max_width: u32,
    max_height: u32,
    format: OutputFormat,
    quality: u8,
    thumbnail_quality: u8,
}

impl ImageTransformer {
    pub fn new(
        max_width: u32,
        max_height: u32,
        format: OutputFormat,
        quality: u8,
        thumbnail_quality: u8,
    ) -> Self {
        Self {
            max_width: max_width.max(1),
            max_height: max_height.max(1),
            format,
            quality,
            thumbnail_quality,
        }
    }

    pub fn from_config(config: &ImageConfig) -> Result<Self, ProcessingError> {
        Ok(Self::new(
            config.max_width,
            config.max_height,
            OutputFormat::parse(&config.format)?,
            config.quality,
            config.thumbnail_quality,
        ))
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    /// Downsize into the configured bounding box (never enlarging) and re-encode
    /// to the target format. The returned info is probed from the output bytes.
    pub fn normalize(&self, data: &[u8]) -> Result<Rendition, ProcessingError> {
        let img = decode(data)?;
        let (orig_width, orig_height) = img.dimensions();

        let resized = ImageResize::fit(img, self.max_width, self.max_height);
        let output = ImageEncoder::encode(&resized, self.format, self.quality)?;
        let info = Self::probe(&output)?;

        tracing::debug!(
            original_width = orig_width,
            original_height = orig_height,
            width = info.width,
            height = info.height,
            format = %info.format,
            size_bytes = info.size,
            "Image normalized"
        );

        Ok(Rendition { data: output, info })
    }

    /// Cover-fit crop of the original bytes to `width x height`, encoded at the
    /// thumbnail quality.
    pub fn thumbnail(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Rendition, ProcessingError> {
        let img = decode(data)?;
        let thumb = ImageResize::cover(&img, width.max(1), height.max(1));
        let output = ImageEncoder::encode(&thumb, self.format, self.thumbnail_quality)?;
        let info = Self::probe(&output)?;

        Ok(Rendition { data: output, info })
    }

    /// Read dimensions and format without decoding pixel data.
    pub fn probe(data: &[u8]) -> Result<ImageInfo, ProcessingError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        let format = reader
            .format()
            .map(|f| format!("{:?}", f).to_lowercase())
            .ok_or_else(|| ProcessingError::Decode("Unrecognized image format".to_string()))?;

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        Ok(ImageInfo {
            width,
            height,
            format,
            size: data.len() as u64,
        })
    }
}

fn decode(data: &[u8]) -> Result<DynamicImage, ProcessingError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ProcessingError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| ProcessingError::Decode(e.to_string()))
}
