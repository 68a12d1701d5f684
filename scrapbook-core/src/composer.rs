//! A composition session: one scene plus its gesture state.
//!
//! This is the single input-handling path. Every event runs to completion
//! before the next one, so the scene needs no internal locking.

use serde::{Deserialize, Serialize};

use crate::{
    describe, gesture, Cursor, DescriptionStyle, Direction, GestureState, LayerId, LayerSummary,
    NaturalSize, PointerEvent, Scene,
};

/// Result of handling a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerOutcome {
    /// Gesture state after the event.
    pub gesture: GestureState,
    /// Cursor hint after the event.
    pub cursor: Cursor,
    /// Whether the canvas should be repainted.
    pub redraw: bool,
}

/// One composition session.
#[derive(Debug, Clone)]
pub struct Composer<I> {
    scene: Scene<I>,
    gesture: GestureState,
    cursor: Cursor,
}

impl<I> Default for Composer<I> {
    fn default() -> Self {
        Self::new(Scene::default())
    }
}

impl<I> Composer<I> {
    /// Wrap an existing scene.
    #[must_use]
    pub fn new(scene: Scene<I>) -> Self {
        Self {
            scene,
            gesture: GestureState::Idle,
            cursor: Cursor::Default,
        }
    }

    /// The scene model.
    #[must_use]
    pub fn scene(&self) -> &Scene<I> {
        &self.scene
    }

    /// Current gesture.
    #[must_use]
    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    /// Current cursor hint.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Feed one pointer event through the gesture controller.
    pub fn pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        let transition = gesture::step(self.gesture, event, &mut self.scene);
        self.gesture = transition.state;
        self.cursor = transition.cursor;
        PointerOutcome {
            gesture: transition.state,
            cursor: transition.cursor,
            redraw: transition.changed,
        }
    }

    /// Add an uploaded image as a new top layer.
    pub fn upload(&mut self, image: I, natural: NaturalSize) -> LayerId {
        self.scene.add_layer(image, natural)
    }

    /// Delete a layer, ending any gesture that targets it.
    pub fn delete(&mut self, id: LayerId) -> bool {
        if self.gesture.active_layer() == Some(id) {
            self.gesture = GestureState::Idle;
            self.cursor = Cursor::Default;
        }
        self.scene.remove_layer(id).is_some()
    }

    /// Replace a layer's caption.
    pub fn set_caption(&mut self, id: LayerId, caption: impl Into<String>) {
        self.scene.update_caption(id, caption);
    }

    /// Select a layer from outside the canvas (e.g. a layer list).
    pub fn select(&mut self, id: LayerId) -> bool {
        self.scene.select(id)
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.scene.clear_selection();
    }

    /// Move the selected layer one step in the paint order.
    ///
    /// Does nothing without a selection.
    pub fn reorder(&mut self, direction: Direction) -> bool {
        match self.scene.selected() {
            Some(id) => self.scene.reorder(id, direction),
            None => false,
        }
    }

    /// Current text description.
    #[must_use]
    pub fn description(&self, style: DescriptionStyle) -> String {
        describe(&self.scene, style)
    }

    /// Listing metadata in depth order.
    #[must_use]
    pub fn summaries(&self) -> Vec<LayerSummary> {
        self.scene.summaries()
    }
}
