//! Hit testing: point → layer and handle lookup.
//!
//! Walks layers from the top of the paint order down to find which one is
//! under a canvas position.

use serde::{Deserialize, Serialize};

use crate::{Cursor, LayerId, Point, Scene};

/// Which control of a layer a point addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    /// The layer body.
    Move,
    /// The scale handle of the selected layer.
    Scale,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    /// Layer under the point.
    pub layer: LayerId,
    /// Addressed control.
    pub handle: Handle,
}

/// Find the topmost layer at `point`.
///
/// Only the selected layer exposes its scale handle, and only the part of
/// the handle inside the layer's own box can be hit. Selection is left
/// untouched; the caller decides what a hit means.
#[must_use]
pub fn hit_test<I>(scene: &Scene<I>, point: Point) -> Option<Hit> {
    let layer = scene.layers().rev().find(|l| l.bounds().contains(point))?;

    let on_handle =
        scene.selected() == Some(layer.id()) && layer.bounds().scale_handle().contains(point);

    Some(Hit {
        layer: layer.id(),
        handle: if on_handle {
            Handle::Scale
        } else {
            Handle::Move
        },
    })
}

/// Cursor hint while hovering with no button held.
///
/// Only the selected layer reacts: resize over its handle, move over its
/// body, default anywhere else or with nothing selected.
#[must_use]
pub fn hover_cursor<I>(scene: &Scene<I>, point: Point) -> Cursor {
    let Some(layer) = scene.selected_layer() else {
        return Cursor::Default;
    };
    let bounds = layer.bounds();
    if bounds.scale_handle().contains(point) {
        Cursor::Resize
    } else if bounds.contains(point) {
        Cursor::Move
    } else {
        Cursor::Default
    }
}
