use crate::error::ProcessingError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

/// Output format for re-encoded renditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, ProcessingError> {
        match s.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(ProcessingError::Config(format!(
                "Invalid output format: {}",
                s
            ))),
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }

    /// File extension used for generated names
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }
}

/// Encodes decoded images into a target format at a given quality.
pub struct ImageEncoder;

impl ImageEncoder {
    /// Encode `img` as `format`. `quality` (1-100) is ignored for lossless PNG.
    pub fn encode(
        img: &DynamicImage,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, ProcessingError> {
        let quality = quality.clamp(1, 100);
        match format {
            OutputFormat::Jpeg => Self::encode_jpeg(img, quality),
            OutputFormat::Png => Self::encode_png(img),
            OutputFormat::WebP => Ok(Self::encode_webp(img, quality)),
        }
    }

    fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ProcessingError> {
        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| ProcessingError::Encode(e.to_string()))?;

        Ok(buffer)
    }

    fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ProcessingError> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        img.write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ProcessingError::Encode(e.to_string()))?;

        Ok(buffer)
    }

    fn encode_webp(img: &DynamicImage, quality: u8) -> Vec<u8> {
        let (width, height) = img.dimensions();

        // Convert to RGBA for WebP encoding
        let rgba_img = img.to_rgba8();

        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        let webp_data = encoder.encode(quality as f32);

        webp_data.to_vec()
    }
}
