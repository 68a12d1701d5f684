//! Local saliency map.
//!
//! The saliency map is a greyscale rendition of the snapshot: every pixel
//! collapses to its luma. It stands in for a dedicated saliency model.

use image::{DynamicImage, ImageFormat};

use crate::error::{RenderError, RenderResult};

/// Convert encoded image bytes to a greyscale PNG.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the input cannot be decoded and
/// [`RenderError::Export`] if the PNG cannot be written.
pub fn greyscale_png(data: &[u8]) -> RenderResult<Vec<u8>> {
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;
    let luma = DynamicImage::ImageLuma8(img.to_luma8());

    let mut buf = std::io::Cursor::new(Vec::new());
    luma.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;

    tracing::debug!("Computed saliency map {}x{}", luma.width(), luma.height());
    Ok(buf.into_inner())
}
