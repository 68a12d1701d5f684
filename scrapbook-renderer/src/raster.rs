//! Image ingestion.
//!
//! Decodes uploaded bytes (or base64 data URIs) into premultiplied RGBA
//! pixmaps ready to paint, and reads back their natural size.

use std::sync::Arc;

use scrapbook_core::NaturalSize;
use tiny_skia::{ColorU8, Pixmap};

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF (first frame only).
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/webp" => Self::WebP,
            "image/gif" => Self::Gif,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // GIF: "GIF8"
        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// MIME type for the format.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// A decoded raster image, cheap to clone.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixmap: Arc<Pixmap>,
    natural: NaturalSize,
    format: ImageFormat,
}

impl RasterImage {
    /// Wrap an existing pixmap.
    ///
    /// # Errors
    ///
    /// Never fails for a valid pixmap; the error path covers the
    /// zero-size check shared with decoded images.
    pub fn from_pixmap(pixmap: Pixmap, format: ImageFormat) -> RenderResult<Self> {
        let natural = NaturalSize::new(pixmap.width(), pixmap.height())?;
        Ok(Self {
            pixmap: Arc::new(pixmap),
            natural,
            format,
        })
    }

    /// A single-colour image, mostly useful for placeholders and tests.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RenderResult<Self> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RenderError::Resource(format!("Cannot allocate {width}x{height} image"))
        })?;
        pixmap.fill(tiny_skia::Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
        Self::from_pixmap(pixmap, ImageFormat::Unknown)
    }

    /// Premultiplied pixels.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Natural size in pixels.
    #[must_use]
    pub fn natural_size(&self) -> NaturalSize {
        self.natural
    }

    /// Format the image was decoded from.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

/// Decode an image from raw bytes.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the bytes cannot be decoded or the
/// image has no pixels.
pub fn load_raster(data: &[u8]) -> RenderResult<RasterImage> {
    let format = ImageFormat::from_magic_bytes(data);

    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    NaturalSize::new(width, height)?;

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        RenderError::Resource(format!("Cannot allocate {width}x{height} image"))
    })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    tracing::debug!("Decoded {format:?} image {width}x{height}");
    RasterImage::from_pixmap(pixmap, format)
}

/// Decode an image from a data URI.
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...`
///
/// # Errors
///
/// Returns an error if the data URI is malformed or the image cannot be decoded.
pub fn load_raster_from_data_uri(uri: &str) -> RenderResult<RasterImage> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    // Find the comma separating metadata from data
    let (metadata, encoded_data) = uri_data
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    let bytes = if metadata.contains(";base64") {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data)
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))?
    } else {
        urlencoding_decode(encoded_data)?
    };

    load_raster(&bytes)
}

/// Simple URL decoding (percent-encoding).
fn urlencoding_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index] == b'%' {
            let byte = input
                .get(index + 1..index + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            result.push(byte);
            index += 3;
        } else {
            result.push(bytes[index]);
            index += 1;
        }
    }

    Ok(result)
}
