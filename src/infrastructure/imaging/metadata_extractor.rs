use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use thiserror::Error;

use crate::application::errors::{Classify, ErrorKind};
use crate::domain::entities::ImageMetadata;
use crate::domain::value_objects::SizeKb;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported or corrupt image: {0}")]
    UnsupportedOrCorrupt(String),
}

impl Classify for ExtractionError {
    fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::UnsupportedOrCorrupt(_) => ErrorKind::UnsupportedOrCorruptImage,
        }
    }
}

/// Reads image headers and derives structural metadata.
///
/// Only the container header is decoded: the format is sniffed from the
/// leading magic bytes and the dimensions come from the header, so the pixel
/// data is never decompressed.
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn extract(bytes: &[u8], object_path: &str) -> Result<ImageMetadata, ExtractionError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ExtractionError::UnsupportedOrCorrupt(e.to_string()))?;

        let format = reader.format().ok_or_else(|| {
            ExtractionError::UnsupportedOrCorrupt(format!(
                "{}: unrecognized image container",
                object_path
            ))
        })?;

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ExtractionError::UnsupportedOrCorrupt(format!("{}: {}", object_path, e)))?;

        ImageMetadata::new(
            object_path.to_string(),
            SizeKb::from_byte_len(bytes.len()),
            width,
            height,
            format_tag(format),
        )
        .map_err(|e| ExtractionError::UnsupportedOrCorrupt(format!("{}: {}", object_path, e)))
    }
}

/// Upper-case tag naming the encoding ("JPEG", "PNG", ...)
fn format_tag(format: ImageFormat) -> Option<String> {
    let tag = match format {
        ImageFormat::Jpeg => "JPEG",
        ImageFormat::Png => "PNG",
        ImageFormat::Gif => "GIF",
        ImageFormat::WebP => "WEBP",
        ImageFormat::Bmp => "BMP",
        ImageFormat::Tiff => "TIFF",
        ImageFormat::Ico => "ICO",
        other => {
            return other
                .extensions_str()
                .first()
                .map(|ext| ext.to_ascii_uppercase())
        }
    };
    Some(tag.to_string())
}
