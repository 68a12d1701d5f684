//! Layer geometry: position, uniform scale and the derived bounding box.

use serde::{Deserialize, Serialize};

use crate::{ComposeError, ComposeResult};

/// Logical canvas width in pixels.
pub const CANVAS_WIDTH: f32 = 600.0;
/// Logical canvas height in pixels.
pub const CANVAS_HEIGHT: f32 = 400.0;
/// Smallest scale a layer can take.
pub const MIN_SCALE: f32 = 0.1;
/// Largest scale a layer can take.
pub const MAX_SCALE: f32 = 5.0;
/// Edge length of the square scale handle.
pub const HANDLE_SIZE: f32 = 10.0;
/// Offset of the scale handle from the top-right corner of a layer.
pub const HANDLE_OFFSET: f32 = 5.0;

/// Clamp a scale factor into `[MIN_SCALE, MAX_SCALE]`.
///
/// `NaN` collapses to [`MIN_SCALE`] so a stored scale is always finite.
#[must_use]
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return MIN_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Scale that fits an image inside a canvas on first appearance.
///
/// Never enlarges: the result is `min(1, canvas_w / w, canvas_h / h)`,
/// clamped like every other scale.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fit_scale(natural: NaturalSize, canvas_width: f32, canvas_height: f32) -> f32 {
    let fit_w = canvas_width / natural.width() as f32;
    let fit_h = canvas_height / natural.height() as f32;
    clamp_scale(1.0_f32.min(fit_w).min(fit_h))
}

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Natural pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NaturalSize {
    width: u32,
    height: u32,
}

impl NaturalSize {
    /// Create a natural size.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::DegenerateImage`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> ComposeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ComposeError::DegenerateImage { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(self) -> u32 {
        self.height
    }
}

/// Axis-aligned box in canvas coordinates. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
}

impl Bounds {
    /// Box of the given size centered on `center`.
    #[must_use]
    pub fn from_center(center: Point, width: f32, height: f32) -> Self {
        Self {
            left: center.x - width / 2.0,
            top: center.y - height / 2.0,
            right: center.x + width / 2.0,
            bottom: center.y + height / 2.0,
        }
    }

    /// Box with its top-left corner at `(left, top)`.
    #[must_use]
    pub fn from_origin(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    /// Whether the point lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }

    /// Width of the box.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the box.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// The scale handle anchored at the top-right corner.
    #[must_use]
    pub fn scale_handle(&self) -> Bounds {
        Bounds::from_origin(
            self.right - HANDLE_OFFSET,
            self.top - HANDLE_OFFSET,
            HANDLE_SIZE,
            HANDLE_SIZE,
        )
    }
}

/// Position (layer center) and uniform scale of a layer.
///
/// The scale is private so every write goes through [`clamp_scale`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    /// Center of the layer in canvas coordinates.
    pub position: Point,
    scale: f32,
}

impl Transform {
    /// Create a transform, clamping the scale.
    #[must_use]
    pub fn new(position: Point, scale: f32) -> Self {
        Self {
            position,
            scale: clamp_scale(scale),
        }
    }

    /// Current scale factor.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Set the scale, clamping it into range.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = clamp_scale(scale);
    }

    /// Rendered `(width, height)` for an image of the given natural size.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rendered_size(&self, natural: NaturalSize) -> (f32, f32) {
        (
            natural.width() as f32 * self.scale,
            natural.height() as f32 * self.scale,
        )
    }

    /// Bounding box for an image of the given natural size.
    #[must_use]
    pub fn bounds(&self, natural: NaturalSize) -> Bounds {
        let (width, height) = self.rendered_size(natural);
        Bounds::from_center(self.position, width, height)
    }
}
