//! Pointer input and cursor hints.

use serde::{Deserialize, Serialize};

use crate::Point;

/// A pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Button pressed.
    Down {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },
    /// Pointer moved, with or without a button held.
    Move {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },
    /// Button released.
    Up,
    /// Pointer left the canvas.
    Leave,
}

impl PointerEvent {
    /// The event's position, if it carries one.
    #[must_use]
    pub fn point(&self) -> Option<Point> {
        match *self {
            Self::Down { x, y } | Self::Move { x, y } => Some(Point::new(x, y)),
            Self::Up | Self::Leave => None,
        }
    }
}

/// Cursor affordance for the current pointer position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    /// Plain arrow.
    #[default]
    Default,
    /// Over a selected layer's body, or dragging.
    Move,
    /// Over the scale handle, or scaling.
    Resize,
}

impl Cursor {
    /// CSS cursor keyword.
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Move => "move",
            Self::Resize => "nesw-resize",
        }
    }
}
