//! Canonical text description of a scene for the prompt service.
//!
//! ```text
//! Image Data:
//! Image ID: 1, X: 300, Y: 200, Caption: "cat", Z-Index: 0
//! ```
//!
//! One line per layer in depth order, joined by `\n` with no trailing
//! newline. Computed on demand from the live scene, never cached.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::{Layer, Scene};

/// Header line that starts every description.
pub const DESCRIPTION_HEADER: &str = "Image Data:";

/// Which fields each layer line carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionStyle {
    /// Id, position, caption and depth.
    #[default]
    Full,
    /// Id, position and depth only.
    Coordinates,
}

/// Describe the scene as text.
#[must_use]
pub fn describe<I>(scene: &Scene<I>, style: DescriptionStyle) -> String {
    let mut text = String::with_capacity(DESCRIPTION_HEADER.len() + scene.len() * 64);
    text.push_str(DESCRIPTION_HEADER);
    for layer in scene.layers() {
        text.push('\n');
        write_layer(&mut text, layer, style);
    }
    text
}

fn write_layer<I>(out: &mut String, layer: &Layer<I>, style: DescriptionStyle) {
    let position = layer.position();
    let (x, y) = (round_coordinate(position.x), round_coordinate(position.y));
    let _ = match style {
        DescriptionStyle::Full => write!(
            out,
            "Image ID: {}, X: {x}, Y: {y}, Caption: \"{}\", Z-Index: {}",
            layer.id(),
            escape_caption(layer.caption()),
            layer.depth(),
        ),
        DescriptionStyle::Coordinates => write!(
            out,
            "Image ID: {}, X: {x}, Y: {y}, Z-Index: {}",
            layer.id(),
            layer.depth(),
        ),
    };
}

/// Round half away from zero to the nearest integer.
#[allow(clippy::cast_possible_truncation)]
fn round_coordinate(value: f32) -> i64 {
    value.round() as i64
}

/// Keep a caption on one line inside its quotes.
fn escape_caption(caption: &str) -> String {
    let mut escaped = String::with_capacity(caption.len());
    for c in caption.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}
