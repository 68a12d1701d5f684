//! HTTP-facing error type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scrapbook_core::LayerId;
use scrapbook_renderer::RenderError;
use serde_json::json;
use thiserror::Error;

use crate::metrics;
use crate::validation::ValidationError;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body failed validation. The scene is unchanged.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The addressed layer does not exist.
    #[error("layer {0} not found")]
    NotFound(LayerId),
    /// The uploaded bytes are not a decodable raster image.
    #[error("could not decode image: {0}")]
    UndecodableImage(RenderError),
    /// Rendering or encoding a frame failed.
    #[error("render failed: {0}")]
    Render(RenderError),
}

impl ApiError {
    /// HTTP status for the error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UndecodableImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Validation(err) => {
                metrics::record_validation_failure(err.kind());
                tracing::debug!("Rejected request: {err}");
            }
            Self::Render(err) => tracing::error!("Render failed: {err}"),
            _ => tracing::debug!("Request failed: {self}"),
        }
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
