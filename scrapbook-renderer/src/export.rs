//! Scene export to encoded images.
//!
//! Renders a [`Scene`] through [`SceneRenderer`] and encodes the frame as
//! PNG or JPEG. Snapshots handed to prompt generation, saliency and
//! synthesis never carry the selection overlay.

use image::ImageEncoder;
use scrapbook_core::Scene;
use tiny_skia::Pixmap;

use crate::error::{RenderError, RenderResult};
use crate::raster::RasterImage;
use crate::render::{Overlay, RendererConfig, SceneRenderer};

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
}

impl ExportFormat {
    /// MIME type of the encoded bytes.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Configuration for scene export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Renderer settings used for the frame.
    pub renderer: RendererConfig,
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            jpeg_quality: 85,
        }
    }
}

/// Exports a [`Scene`] to encoded image bytes.
#[derive(Debug, Clone)]
pub struct SceneExporter {
    renderer: SceneRenderer,
    jpeg_quality: u8,
}

impl Default for SceneExporter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SceneExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self {
            renderer: SceneRenderer::new(config.renderer),
            jpeg_quality: config.jpeg_quality.clamp(1, 100),
        }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Export a scene with the given overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be rendered or encoded.
    pub fn export(
        &self,
        scene: &Scene<RasterImage>,
        overlay: Overlay,
        format: ExportFormat,
    ) -> RenderResult<Vec<u8>> {
        let pixmap = self.renderer.render(scene, overlay)?;
        let bytes = match format {
            ExportFormat::Png => encode_png(&pixmap)?,
            ExportFormat::Jpeg => {
                encode_jpeg(&pixmap, self.renderer.config().background, self.jpeg_quality)?
            }
        };
        tracing::debug!("Exported {:?} snapshot ({} bytes)", format, bytes.len());
        Ok(bytes)
    }

    /// PNG snapshot of the layers without any overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn snapshot_png(&self, scene: &Scene<RasterImage>) -> RenderResult<Vec<u8>> {
        self.export(scene, Overlay::none(), ExportFormat::Png)
    }

    /// The snapshot as a `data:image/png;base64,...` URI.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn snapshot_data_uri(&self, scene: &Scene<RasterImage>) -> RenderResult<String> {
        let png = self.snapshot_png(scene)?;
        Ok(to_data_uri(&png, ExportFormat::Png.mime()))
    }
}

/// Encode a pixmap as PNG.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if encoding fails.
pub fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    pixmap
        .encode_png()
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
}

/// Encode a pixmap as JPEG, flattening transparency onto `background`.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if encoding fails.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode_jpeg(pixmap: &Pixmap, background: [u8; 4], quality: u8) -> RenderResult<Vec<u8>> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut rgb_data = Vec::with_capacity(pixmap.data().len() / 4 * 3);
    // Pixmap data is premultiplied: out = src + bg * (1 - alpha).
    for pixel in pixmap.data().chunks_exact(4) {
        let inv = 1.0 - f32::from(pixel[3]) / 255.0;
        for channel in 0..3 {
            let value = f32::from(background[channel]).mul_add(inv, f32::from(pixel[channel]));
            rgb_data.push(value.round().min(255.0) as u8);
        }
    }

    let mut buf = std::io::Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .write_image(&rgb_data, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

    Ok(buf.into_inner())
}

/// Wrap encoded bytes in a base64 data URI.
#[must_use]
pub fn to_data_uri(bytes: &[u8], mime: &str) -> String {
    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}
