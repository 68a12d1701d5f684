//! Layers - the units of composition.

use serde::{Deserialize, Serialize};

use crate::{Bounds, NaturalSize, Point, Transform};

/// Unique identifier for a layer.
///
/// Assigned from a per-scene monotonic counter starting at 1 and never
/// reused, even after the layer is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(u64);

impl LayerId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A positioned, scaled, depth-ordered raster image.
///
/// `I` is the decoded raster handle; the engine never looks inside it.
#[derive(Debug, Clone)]
pub struct Layer<I> {
    id: LayerId,
    image: I,
    natural: NaturalSize,
    pub(crate) transform: Transform,
    pub(crate) depth: usize,
    pub(crate) caption: String,
}

impl<I> Layer<I> {
    pub(crate) fn new(id: LayerId, image: I, natural: NaturalSize, transform: Transform) -> Self {
        Self {
            id,
            image,
            natural,
            transform,
            depth: 0,
            caption: String::new(),
        }
    }

    /// Layer identifier.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// The decoded raster handle.
    #[must_use]
    pub fn image(&self) -> &I {
        &self.image
    }

    /// Natural size of the image.
    #[must_use]
    pub fn natural_size(&self) -> NaturalSize {
        self.natural
    }

    /// Position and scale.
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Center of the layer.
    #[must_use]
    pub fn position(&self) -> Point {
        self.transform.position
    }

    /// Current scale.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.transform.scale()
    }

    /// Paint order index, 0 = bottom.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Free-text caption (empty when unset).
    #[must_use]
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Rendered bounding box.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.transform.bounds(self.natural)
    }

    /// Listing metadata for this layer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn summary(&self, selected: bool) -> LayerSummary {
        let (width, height) = self.transform.rendered_size(self.natural);
        LayerSummary {
            id: self.id,
            x: self.transform.position.x.round() as i64,
            y: self.transform.position.y.round() as i64,
            depth: self.depth,
            scale: self.transform.scale(),
            width,
            height,
            caption: self.caption.clone(),
            selected,
        }
    }
}

/// Serializable listing entry for a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    /// Layer identifier.
    pub id: LayerId,
    /// Rounded center X.
    pub x: i64,
    /// Rounded center Y.
    pub y: i64,
    /// Paint order index.
    pub depth: usize,
    /// Current scale.
    pub scale: f32,
    /// Rendered width in pixels.
    pub width: f32,
    /// Rendered height in pixels.
    pub height: f32,
    /// Caption text.
    pub caption: String,
    /// Whether this layer is the current selection.
    pub selected: bool,
}
