use std::fs;
use std::path::PathBuf;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use log::info;

use crate::error::ViewerError;

pub const THUMBNAIL_SIZE: u32 = 100;
pub const DEFAULT_THUMBNAIL_PATH: &str = "ThumbnailFromFlickr.jpg";
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Where and how thumbnails get written. There is only ever one file,
/// every generation overwrites it
#[derive(Debug, Clone)]
pub struct ThumbnailSpec {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub path: PathBuf,
    /// Fails generation with `ResizeAborted` instead of resizing
    pub abort_resize: bool,
}

impl Default for ThumbnailSpec {
    fn default() -> Self {
        Self {
            width: THUMBNAIL_SIZE,
            height: THUMBNAIL_SIZE,
            quality: DEFAULT_JPEG_QUALITY,
            path: PathBuf::from(DEFAULT_THUMBNAIL_PATH),
            abort_resize: false,
        }
    }
}

/// Scales the image down so neither side exceeds the box, keeping the aspect ratio
pub fn fit_within(image: &DynamicImage, spec: &ThumbnailSpec) -> Result<DynamicImage, ViewerError> {
    if spec.abort_resize {
        return Err(ViewerError::ResizeAborted);
    }
    Ok(image.thumbnail(spec.width, spec.height))
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ViewerError> {
    image::load_from_memory(bytes).map_err(ViewerError::Decode)
}

pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ViewerError> {
    let mut buffer = Vec::new();
    // jpeg has no alpha channel
    let rgb = image.to_rgb8();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&rgb)
        .map_err(ViewerError::Encode)?;
    Ok(buffer)
}

pub struct ThumbnailGenerator {
    pub spec: ThumbnailSpec,
}

impl ThumbnailGenerator {
    pub fn new(spec: ThumbnailSpec) -> Self {
        Self { spec }
    }

    /// Decodes, shrinks and writes the thumbnail, returning the path written to
    pub fn generate(&self, bytes: &[u8]) -> Result<PathBuf, ViewerError> {
        let full_size = decode(bytes)?;
        let thumbnail = fit_within(&full_size, &self.spec)?;
        let jpeg = encode_jpeg(&thumbnail, self.spec.quality)?;
        fs::write(&self.spec.path, &jpeg).map_err(|source| ViewerError::Write {
            path: self.spec.path.clone(),
            source,
        })?;
        info!(
            "Wrote {}x{} thumbnail to {}",
            thumbnail.width(),
            thumbnail.height(),
            self.spec.path.display()
        );
        Ok(self.spec.path.clone())
    }
}
