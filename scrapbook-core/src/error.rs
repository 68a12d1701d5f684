//! Error types for composition operations.
//!
//! Registry mutations are forgiving and never fail; these errors only come
//! from strict lookups and from constructing invalid image metadata.

use thiserror::Error;

use crate::LayerId;

/// Result type for composition operations.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Errors that can occur in composition operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// Layer not found in scene.
    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),

    /// An image reported a zero width or height.
    #[error("Image has degenerate size {width}x{height}")]
    DegenerateImage {
        /// Reported width in pixels.
        width: u32,
        /// Reported height in pixels.
        height: u32,
    },
}
