//! Scene renderer: paints layers in depth order onto a pixmap.

use scrapbook_core::{Composer, Layer, LayerId, Scene};
use tiny_skia::{
    Color, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

use crate::error::{RenderError, RenderResult};
use crate::raster::RasterImage;

/// Configuration for the renderer.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Background colour as RGBA bytes.
    pub background: [u8; 4],
    /// Selection rectangle and idle handle colour.
    pub selection_color: [u8; 4],
    /// Handle colour while a scale gesture is in progress.
    pub active_handle_color: [u8; 4],
    /// Selection rectangle stroke width.
    pub selection_stroke_width: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            background: [255, 255, 255, 255],
            selection_color: [0, 0, 255, 255],
            active_handle_color: [255, 0, 0, 255],
            selection_stroke_width: 2.0,
        }
    }
}

/// Selection affordances to draw on top of the layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlay {
    /// Layer to outline.
    pub selection: Option<LayerId>,
    /// Whether a scale gesture is in progress.
    pub scaling: bool,
}

impl Overlay {
    /// No affordances, used for snapshots sent to other services.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Affordances matching a live session.
    #[must_use]
    pub fn from_composer<I>(composer: &Composer<I>) -> Self {
        Self {
            selection: composer.scene().selected(),
            scaling: composer.gesture().is_scaling(),
        }
    }
}

/// Paints scenes of [`RasterImage`] layers.
#[derive(Debug, Clone, Default)]
pub struct SceneRenderer {
    config: RendererConfig,
}

impl SceneRenderer {
    /// Create a new renderer with the given configuration.
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Get the renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Render a frame.
    ///
    /// Clears the surface, paints every layer bottom to top and then the
    /// overlay. The scene is only read.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render(&self, scene: &Scene<RasterImage>, overlay: Overlay) -> RenderResult<Pixmap> {
        let (width, height) = (scene.width().max(1.0) as u32, scene.height().max(1.0) as u32);
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RenderError::Surface(format!("Failed to create {width}x{height} pixmap"))
        })?;

        let bg = self.config.background;
        pixmap.fill(Color::from_rgba8(bg[0], bg[1], bg[2], bg[3]));

        for layer in scene.layers() {
            paint_layer(&mut pixmap, layer);
        }

        if let Some(layer) = overlay.selection.and_then(|id| scene.get(id)) {
            self.paint_selection(&mut pixmap, layer, overlay.scaling);
        }

        tracing::trace!(
            "Rendered {} layers at {width}x{height}, selection {:?}",
            scene.len(),
            overlay.selection
        );
        Ok(pixmap)
    }

    fn paint_selection(&self, pixmap: &mut Pixmap, layer: &Layer<RasterImage>, scaling: bool) {
        let bounds = layer.bounds();

        let mut paint = Paint::default();
        let [r, g, b, a] = self.config.selection_color;
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        if let Some(rect) = Rect::from_ltrb(bounds.left, bounds.top, bounds.right, bounds.bottom) {
            let path = PathBuilder::from_rect(rect);
            let stroke = Stroke {
                width: self.config.selection_stroke_width,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }

        let handle = bounds.scale_handle();
        if let Some(rect) = Rect::from_ltrb(handle.left, handle.top, handle.right, handle.bottom) {
            if scaling {
                let [r, g, b, a] = self.config.active_handle_color;
                paint.set_color_rgba8(r, g, b, a);
            }
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }
}

/// Draw one layer centered on its position at its rendered size.
fn paint_layer(pixmap: &mut Pixmap, layer: &Layer<RasterImage>) {
    let bounds = layer.bounds();
    let scale = layer.scale();
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    let transform = Transform::from_row(scale, 0.0, 0.0, scale, bounds.left, bounds.top);
    pixmap.draw_pixmap(0, 0, layer.image().pixmap().as_ref(), &paint, transform, None);
}
