//! Layer registry: the scene model.
//!
//! Identity and depth are kept apart: layers are stored by id, and a
//! separate vector holds ids in paint order so that `depth == index`.
//! Rendering and description read that order and never rearrange storage.

use std::collections::BTreeMap;

use crate::{
    fit_scale, ComposeError, ComposeResult, Layer, LayerId, LayerSummary, NaturalSize, Point,
    Transform, CANVAS_HEIGHT, CANVAS_WIDTH,
};

/// A scene containing all layers plus the selection.
#[derive(Debug, Clone)]
pub struct Scene<I> {
    /// All layers, indexed by ID.
    layers: BTreeMap<LayerId, Layer<I>>,
    /// Layer IDs bottom to top; position is depth.
    order: Vec<LayerId>,
    /// Currently selected layer, always live when set.
    selected: Option<LayerId>,
    /// Last id handed out.
    last_id: u64,
    width: f32,
    height: f32,
}

impl<I> Default for Scene<I> {
    fn default() -> Self {
        Self::new(CANVAS_WIDTH, CANVAS_HEIGHT)
    }
}

impl<I> Scene<I> {
    /// Create a new empty scene with the given canvas size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            layers: BTreeMap::new(),
            order: Vec::new(),
            selected: None,
            last_id: 0,
            width,
            height,
        }
    }

    /// Canvas width.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Canvas height.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Add a layer on top of the scene.
    ///
    /// The layer is centered on the canvas and scaled so the image fits.
    pub fn add_layer(&mut self, image: I, natural: NaturalSize) -> LayerId {
        self.last_id += 1;
        let id = LayerId::new(self.last_id);
        let transform = Transform::new(
            Point::new(self.width / 2.0, self.height / 2.0),
            fit_scale(natural, self.width, self.height),
        );

        let mut layer = Layer::new(id, image, natural, transform);
        layer.depth = self.order.len();
        self.order.push(id);
        self.layers.insert(id, layer);

        tracing::debug!(
            "Added layer {id} ({}x{}) at depth {}, scale {}",
            natural.width(),
            natural.height(),
            self.order.len() - 1,
            transform.scale()
        );
        id
    }

    /// Remove a layer. Absent ids are ignored.
    ///
    /// Clears the selection if it pointed at the removed layer and compacts
    /// the remaining depths. Other ids are untouched.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer<I>> {
        let layer = self.layers.remove(&id)?;
        self.order.retain(|&lid| lid != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.renumber();
        tracing::debug!("Removed layer {id}, {} remaining", self.order.len());
        Some(layer)
    }

    /// Update position and/or scale. Absent ids are ignored.
    ///
    /// Scale is clamped, never rejected.
    pub fn update_transform(&mut self, id: LayerId, position: Option<Point>, scale: Option<f32>) {
        let Some(layer) = self.layers.get_mut(&id) else {
            return;
        };
        if let Some(position) = position {
            layer.transform.position = position;
        }
        if let Some(scale) = scale {
            layer.transform.set_scale(scale);
        }
    }

    /// Replace a layer's caption. Absent ids are ignored.
    pub fn update_caption(&mut self, id: LayerId, text: impl Into<String>) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.caption = text.into();
        }
    }

    /// Get a layer by ID.
    #[must_use]
    pub fn get(&self, id: LayerId) -> Option<&Layer<I>> {
        self.layers.get(&id)
    }

    /// Get a layer by ID, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::LayerNotFound`] if there is no such layer.
    pub fn layer(&self, id: LayerId) -> ComposeResult<&Layer<I>> {
        self.layers.get(&id).ok_or(ComposeError::LayerNotFound(id))
    }

    /// Whether a layer with this id is live.
    #[must_use]
    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Layers in ascending depth order (bottom first).
    pub fn layers(&self) -> impl DoubleEndedIterator<Item = &Layer<I>> {
        self.order.iter().filter_map(|id| self.layers.get(id))
    }

    /// Layer ids in ascending depth order.
    #[must_use]
    pub fn depth_order(&self) -> &[LayerId] {
        &self.order
    }

    /// Listing metadata in depth order.
    #[must_use]
    pub fn summaries(&self) -> Vec<LayerSummary> {
        self.layers()
            .map(|layer| layer.summary(self.selected == Some(layer.id())))
            .collect()
    }

    /// Select a layer. Returns `false` (and leaves the selection alone) if
    /// the id is not live.
    pub fn select(&mut self, id: LayerId) -> bool {
        if !self.layers.contains_key(&id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Currently selected layer id.
    #[must_use]
    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    /// Currently selected layer.
    #[must_use]
    pub fn selected_layer(&self) -> Option<&Layer<I>> {
        self.selected.and_then(|id| self.layers.get(&id))
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Whether the depth fields form exactly `{0, ..., N-1}` in paint order.
    #[must_use]
    pub fn depths_are_contiguous(&self) -> bool {
        self.order.len() == self.layers.len()
            && self
                .order
                .iter()
                .enumerate()
                .all(|(index, id)| self.layers.get(id).is_some_and(|l| l.depth == index))
    }

    pub(crate) fn order_mut(&mut self) -> &mut Vec<LayerId> {
        &mut self.order
    }

    /// Assign every layer its positional index in the paint order.
    pub(crate) fn renumber(&mut self) {
        for (index, id) in self.order.iter().enumerate() {
            if let Some(layer) = self.layers.get_mut(id) {
                layer.depth = index;
            }
        }
    }
}
