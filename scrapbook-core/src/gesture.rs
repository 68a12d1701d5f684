//! Gesture controller: drag-move and drag-scale as an explicit state value.
//!
//! ```text
//!            down on body                 down on handle
//!   Idle ─────────────────▶ Dragging   Idle ─────────────▶ Scaling
//!    ▲                         │         ▲                    │
//!    └──────── up / leave ─────┘         └──── up / leave ────┘
//! ```
//!
//! The state is passed in and returned by [`step`]; nothing else records
//! whether a gesture is in progress.

use serde::{Deserialize, Serialize};

use crate::{clamp_scale, hit_test, hover_cursor, Cursor, Handle, LayerId, Point, PointerEvent, Scene};

/// Current gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GestureState {
    /// No button held.
    #[default]
    Idle,
    /// Moving a layer; its center follows the pointer.
    Dragging {
        /// Layer being moved.
        layer: LayerId,
    },
    /// Scaling a layer by pointer distance from its center.
    Scaling {
        /// Layer being scaled.
        layer: LayerId,
        /// Scale when the gesture started.
        initial_scale: f32,
        /// Pointer distance from the center when the gesture started.
        initial_distance: f32,
    },
}

impl GestureState {
    /// Whether no gesture is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether a scale gesture is in progress.
    #[must_use]
    pub fn is_scaling(&self) -> bool {
        matches!(self, Self::Scaling { .. })
    }

    /// Layer targeted by the active gesture.
    #[must_use]
    pub fn active_layer(&self) -> Option<LayerId> {
        match *self {
            Self::Idle => None,
            Self::Dragging { layer } | Self::Scaling { layer, .. } => Some(layer),
        }
    }
}

/// Outcome of feeding one event to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// State after the event.
    pub state: GestureState,
    /// Cursor hint after the event.
    pub cursor: Cursor,
    /// Whether geometry or selection changed and the canvas needs a repaint.
    pub changed: bool,
}

impl Transition {
    fn idle(cursor: Cursor, changed: bool) -> Self {
        Self {
            state: GestureState::Idle,
            cursor,
            changed,
        }
    }
}

/// Advance the gesture state machine by one pointer event.
pub fn step<I>(state: GestureState, event: PointerEvent, scene: &mut Scene<I>) -> Transition {
    match event {
        PointerEvent::Down { x, y } => {
            // A press while a gesture is active means the release was lost:
            // finish the old gesture and treat this as a fresh press.
            if !state.is_idle() {
                tracing::debug!("Pointer down during {state:?}; finalizing previous gesture");
            }
            press(scene, Point::new(x, y))
        }
        PointerEvent::Move { x, y } => motion(state, scene, Point::new(x, y)),
        PointerEvent::Up | PointerEvent::Leave => {
            if !state.is_idle() {
                tracing::debug!("Gesture ended: {state:?}");
            }
            Transition::idle(Cursor::Default, !state.is_idle())
        }
    }
}

fn press<I>(scene: &mut Scene<I>, point: Point) -> Transition {
    let Some(hit) = hit_test(scene, point) else {
        // Background press keeps whatever was selected.
        return Transition::idle(hover_cursor(scene, point), false);
    };
    scene.select(hit.layer);

    let state = match hit.handle {
        Handle::Move => GestureState::Dragging { layer: hit.layer },
        Handle::Scale => {
            let (initial_scale, center) = scene
                .get(hit.layer)
                .map_or((1.0, point), |l| (l.scale(), l.position()));
            GestureState::Scaling {
                layer: hit.layer,
                initial_scale,
                initial_distance: point.distance_to(center),
            }
        }
    };
    tracing::debug!("Gesture started: {state:?}");

    Transition {
        state,
        cursor: cursor_for(state),
        changed: true,
    }
}

fn motion<I>(state: GestureState, scene: &mut Scene<I>, point: Point) -> Transition {
    match state {
        GestureState::Idle => Transition::idle(hover_cursor(scene, point), false),

        GestureState::Dragging { layer } => {
            if !scene.contains(layer) {
                return Transition::idle(Cursor::Default, false);
            }
            scene.update_transform(layer, Some(point), None);
            Transition {
                state,
                cursor: Cursor::Move,
                changed: true,
            }
        }

        GestureState::Scaling {
            layer,
            initial_scale,
            initial_distance,
        } => {
            let Some(center) = scene.get(layer).map(crate::Layer::position) else {
                return Transition::idle(Cursor::Default, false);
            };
            // Zero starting distance has no meaningful ratio; skip this event.
            if initial_distance <= f32::EPSILON || !initial_distance.is_finite() {
                return Transition {
                    state,
                    cursor: Cursor::Resize,
                    changed: false,
                };
            }
            let ratio = point.distance_to(center) / initial_distance;
            scene.update_transform(layer, None, Some(clamp_scale(initial_scale * ratio)));
            Transition {
                state,
                cursor: Cursor::Resize,
                changed: true,
            }
        }
    }
}

fn cursor_for(state: GestureState) -> Cursor {
    match state {
        GestureState::Idle => Cursor::Default,
        GestureState::Dragging { .. } => Cursor::Move,
        GestureState::Scaling { .. } => Cursor::Resize,
    }
}
