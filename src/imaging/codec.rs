//! Decode and encode at the edge of the editor.
//!
//! ## Supported formats
//!
//! | MIME | Extensions | Encoder |
//! |---|---|---|
//! | `image/png` | `png` | `image::codecs::png::PngEncoder` (RGBA8) |
//! | `image/jpeg` | `jpg`, `jpeg` | `image::codecs::jpeg::JpegEncoder` (RGB8, alpha dropped) |
//!
//! Decoding sniffs the container with `image::guess_format` and then checks
//! the result against the MIME allow-list above. Sniffing alone is not
//! enough: `guess_format` recognises GIF, WebP, BMP and others, and those
//! must be rejected even when a decoder for them would succeed.

use super::raster::Raster;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// One of the two image types the editor reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MimeType {
    Png,
    Jpeg,
}

impl MimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Png => "image/png",
            MimeType::Jpeg => "image/jpeg",
        }
    }

    /// Parse an exact MIME string (`image/png`, `image/jpeg`).
    pub fn parse(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(MimeType::Png),
            "image/jpeg" => Some(MimeType::Jpeg),
            _ => None,
        }
    }

    /// Map a file extension (without the dot, any case) to its MIME type.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(MimeType::Png),
            "jpg" | "jpeg" => Some(MimeType::Jpeg),
            _ => None,
        }
    }

    /// Cross-check a sniffed container format against the allow-list, going
    /// through the format's canonical extension.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        format
            .extensions_str()
            .first()
            .and_then(|ext| Self::from_extension(ext))
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MimeType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CodecError::UnsupportedFormat(s.to_string()))
    }
}

/// Whether the editor can read and write `mime`.
pub fn is_supported_mime(mime: &str) -> bool {
    MimeType::parse(mime).is_some()
}

/// A decoded image together with the format it was stored in.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub raster: Raster,
    pub mime: MimeType,
}

/// Decode PNG or JPEG bytes into an RGBA raster anchored at `(0, 0)`.
pub fn decode(bytes: &[u8]) -> Result<Decoded, CodecError> {
    let format = image::guess_format(bytes)
        .map_err(|_| CodecError::UnsupportedFormat("unrecognized image data".to_string()))?;
    let mime = MimeType::from_image_format(format)
        .ok_or_else(|| CodecError::UnsupportedFormat(format!("{format:?}")))?;
    let image =
        image::load_from_memory_with_format(bytes, format).map_err(CodecError::Decode)?;

    Ok(Decoded {
        raster: Raster::from_dynamic(image),
        mime,
    })
}

/// Encode `raster` as `mime`. `jpeg_quality` (1-100) is ignored for PNG.
pub fn encode(raster: &Raster, mime: MimeType, jpeg_quality: u8) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    let (width, height) = (raster.width(), raster.height());

    match mime {
        MimeType::Png => PngEncoder::new(&mut buf)
            .write_image(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(CodecError::Encode)?,
        MimeType::Jpeg => {
            let rgb: RgbImage = raster.as_rgba().convert();
            JpegEncoder::new_with_quality(&mut buf, jpeg_quality.clamp(1, 100))
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(CodecError::Encode)?
        }
    }

    Ok(buf)
}
