//! # Scrapbook Server Library
//!
//! Shared types and functionality for the composer server.
//! This library is used by both the binary and integration tests.
//!
//! One [`AppState`] holds a single composition session behind a mutex.
//! Handlers lock it for the duration of one engine operation, so pointer
//! events and edits are applied strictly one after another.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use scrapbook_renderer::{RasterComposer, SceneExporter};
use tokio::sync::Mutex;

pub mod collaborators;
pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod prompt;
pub mod routes;
pub mod synthesis;
pub mod validation;

pub use collaborators::{
    CollaboratorError, Collaborators, GreyscaleSaliency, ImageSynthesizer, PromptGenerator,
    RetryConfig, SaliencyProcessor,
};
pub use config::{ServerArgs, ServerConfig};
pub use error::ApiError;
pub use prompt::OpenAiPromptClient;
pub use synthesis::HttpSynthesisClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    composer: Arc<Mutex<RasterComposer>>,
    exporter: Arc<SceneExporter>,
    collaborators: Collaborators,
}

impl AppState {
    /// Create state with an empty session and the given collaborators.
    #[must_use]
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            composer: Arc::new(Mutex::new(RasterComposer::default())),
            exporter: Arc::new(SceneExporter::with_defaults()),
            collaborators,
        }
    }

    /// Build collaborators from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or a configured
    /// URL is malformed.
    pub fn from_config(config: &ServerConfig) -> Result<Self, CollaboratorError> {
        let http = collaborators::http_client(config.request_timeout)?;
        let prompt = OpenAiPromptClient::new(
            http.clone(),
            &config.prompt_url,
            config.prompt_model.clone(),
            config.openai_api_key.clone(),
        )?;
        let synthesis = HttpSynthesisClient::new(http, config.synthesis_url.as_deref())?;

        Ok(Self::new(Collaborators {
            prompt: Arc::new(prompt),
            saliency: Arc::new(GreyscaleSaliency),
            synthesis: Arc::new(synthesis),
        }))
    }

    /// The composition session.
    #[must_use]
    pub fn composer(&self) -> &Mutex<RasterComposer> {
        &self.composer
    }

    /// Snapshot encoder.
    #[must_use]
    pub fn exporter(&self) -> &SceneExporter {
        &self.exporter
    }

    /// Downstream services.
    #[must_use]
    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }
}

/// Build the API and health router.
///
/// The binary adds `/metrics`, CORS, request ids and tracing on top.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints (Kubernetes probes)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness)) // Backward compatible
        .route(
            "/api/layers",
            get(routes::list_layers).post(routes::upload_layer),
        )
        .route("/api/layers/{id}", axum::routing::delete(routes::delete_layer))
        .route("/api/layers/{id}/caption", put(routes::set_caption))
        .route("/api/layers/{id}/select", post(routes::select_layer))
        .route("/api/selection", axum::routing::delete(routes::clear_selection))
        .route("/api/reorder", post(routes::reorder))
        .route("/api/pointer", post(routes::pointer))
        .route("/api/description", get(routes::description))
        .route("/api/render.png", get(routes::render_png))
        .route("/api/snapshot.png", get(routes::snapshot_png))
        .route("/api/prompt", post(routes::generate_prompt))
        .route("/api/saliency", post(routes::saliency))
        .route("/api/synthesize", post(routes::synthesize))
        // Oversized uploads are rejected by validation, not the extractor.
        .layer(DefaultBodyLimit::max(validation::MAX_UPLOAD_BYTES * 2))
        .with_state(state)
}
