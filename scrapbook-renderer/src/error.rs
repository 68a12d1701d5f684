//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Resource loading failed (undecodable or degenerate image).
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// The target surface could not be allocated.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Encoding a rendered frame failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl From<scrapbook_core::ComposeError> for RenderError {
    fn from(err: scrapbook_core::ComposeError) -> Self {
        Self::Resource(err.to_string())
    }
}
