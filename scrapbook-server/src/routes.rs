//! API route handlers.
//!
//! Each handler holds the session lock for one engine operation only.
//! Calls to downstream services happen after the lock is released.

use axum::{
    body::Bytes,
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use scrapbook_core::{
    DescriptionStyle, Direction, GestureState, LayerId, LayerSummary, PointerEvent, PointerOutcome,
};
use scrapbook_renderer::{load_raster, to_data_uri, ExportFormat, ImageFormat, Overlay};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::metrics;
use crate::prompt::prompt_or_placeholder;
use crate::validation::{
    validate_caption, validate_layer_count, validate_prompt, validate_upload_size,
};
use crate::AppState;

/// Layer list in depth order plus the current selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayersResponse {
    /// Layers from bottom to top.
    pub layers: Vec<LayerSummary>,
    /// Selected layer, if any.
    pub selected: Option<LayerId>,
}

/// Caption edit body.
#[derive(Debug, Deserialize)]
pub struct CaptionRequest {
    /// New caption text.
    pub caption: String,
}

/// Reorder body.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Direction to move the selected layer.
    pub direction: Direction,
}

/// Description query string.
#[derive(Debug, Deserialize)]
pub struct DescriptionQuery {
    /// Line style, `full` when omitted.
    #[serde(default)]
    pub style: DescriptionStyle,
}

/// Prompt generation reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptResponse {
    /// Generated prompt or the placeholder text.
    pub prompt: String,
}

/// Synthesis body.
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    /// Prompt guiding the synthesis.
    pub prompt: String,
}

/// Reply from an image-producing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageReply {
    /// The produced image as a data URI.
    Image {
        /// `data:<mime>;base64,...`
        image: String,
    },
    /// Placeholder message when the service failed.
    Error {
        /// Human readable failure.
        error: String,
    },
}

fn layers_response(composer: &scrapbook_renderer::RasterComposer) -> LayersResponse {
    LayersResponse {
        layers: composer.summaries(),
        selected: composer.scene().selected(),
    }
}

fn png_response(bytes: Vec<u8>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, ExportFormat::Png.mime())], bytes)
}

/// List layers in depth order.
#[tracing::instrument(name = "list_layers", skip(state))]
pub async fn list_layers(State(state): State<AppState>) -> Json<LayersResponse> {
    let composer = state.composer().lock().await;
    Json(layers_response(&composer))
}

/// Upload raw image bytes as a new top layer.
///
/// # Errors
///
/// `400` if the body is empty, too large or the scene is full, `422` if the
/// bytes do not decode.
#[tracing::instrument(name = "upload_layer", skip(state, body), fields(bytes = body.len()))]
pub async fn upload_layer(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<LayerSummary>), ApiError> {
    validate_upload_size(body.len())?;
    validate_layer_count(state.composer().lock().await.scene().len())?;

    let image = load_raster(&body).map_err(ApiError::UndecodableImage)?;
    let natural = image.natural_size();

    let mut composer = state.composer().lock().await;
    // Re-check: another upload may have landed while decoding.
    validate_layer_count(composer.scene().len())?;
    let id = composer.upload(image, natural);
    metrics::set_layers(composer.scene().len());

    let summary = composer
        .scene()
        .get(id)
        .map(|layer| layer.summary(composer.scene().selected() == Some(id)))
        .ok_or(ApiError::NotFound(id))?;
    tracing::info!("Uploaded layer {id} ({}x{})", natural.width(), natural.height());
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Delete a layer. Absent ids are a no-op.
#[tracing::instrument(name = "delete_layer", skip(state))]
pub async fn delete_layer(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    let mut composer = state.composer().lock().await;
    if composer.delete(LayerId::new(id)) {
        metrics::set_layers(composer.scene().len());
    }
    StatusCode::NO_CONTENT
}

/// Replace a layer's caption.
///
/// # Errors
///
/// `400` if the caption exceeds the length limit.
#[tracing::instrument(name = "set_caption", skip(state, request))]
pub async fn set_caption(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<CaptionRequest>,
) -> Result<StatusCode, ApiError> {
    validate_caption(&request.caption)?;
    state
        .composer()
        .lock()
        .await
        .set_caption(LayerId::new(id), request.caption);
    Ok(StatusCode::NO_CONTENT)
}

/// Select a layer from the list.
///
/// # Errors
///
/// `404` if the layer does not exist.
#[tracing::instrument(name = "select_layer", skip(state))]
pub async fn select_layer(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<LayersResponse>, ApiError> {
    let id = LayerId::new(id);
    let mut composer = state.composer().lock().await;
    if !composer.select(id) {
        return Err(ApiError::NotFound(id));
    }
    Ok(Json(layers_response(&composer)))
}

/// Clear the selection.
#[tracing::instrument(name = "clear_selection", skip(state))]
pub async fn clear_selection(State(state): State<AppState>) -> Json<LayersResponse> {
    let mut composer = state.composer().lock().await;
    composer.clear_selection();
    Json(layers_response(&composer))
}

/// Move the selected layer one step up or down.
#[tracing::instrument(name = "reorder", skip(state))]
pub async fn reorder(
    State(state): State<AppState>,
    Json(request): Json<ReorderRequest>,
) -> Json<LayersResponse> {
    let mut composer = state.composer().lock().await;
    composer.reorder(request.direction);
    Json(layers_response(&composer))
}

/// Feed one pointer event to the gesture controller.
#[tracing::instrument(name = "pointer", skip(state))]
pub async fn pointer(
    State(state): State<AppState>,
    Json(event): Json<PointerEvent>,
) -> Json<PointerOutcome> {
    let outcome = state.composer().lock().await.pointer(event);
    if matches!(event, PointerEvent::Down { .. }) {
        match outcome.gesture {
            GestureState::Dragging { .. } => metrics::record_gesture("drag"),
            GestureState::Scaling { .. } => metrics::record_gesture("scale"),
            GestureState::Idle => {}
        }
    }
    Json(outcome)
}

/// Current scene description as plain text.
#[tracing::instrument(name = "description", skip(state))]
pub async fn description(
    State(state): State<AppState>,
    Query(query): Query<DescriptionQuery>,
) -> impl IntoResponse {
    let text = state.composer().lock().await.description(query.style);
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text)
}

/// The frame as displayed, selection overlay included.
///
/// # Errors
///
/// `500` if rendering fails.
#[tracing::instrument(name = "render_png", skip(state))]
pub async fn render_png(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let composer = state.composer().lock().await;
    let bytes = state
        .exporter()
        .export(
            composer.scene(),
            Overlay::from_composer(&composer),
            ExportFormat::Png,
        )
        .map_err(ApiError::Render)?;
    Ok(png_response(bytes))
}

/// Overlay-free snapshot of the layers.
///
/// # Errors
///
/// `500` if rendering fails.
#[tracing::instrument(name = "snapshot_png", skip(state))]
pub async fn snapshot_png(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let bytes = take_snapshot(&state).await?;
    Ok(png_response(bytes))
}

async fn take_snapshot(state: &AppState) -> Result<Vec<u8>, ApiError> {
    let composer = state.composer().lock().await;
    state
        .exporter()
        .snapshot_png(composer.scene())
        .map_err(ApiError::Render)
}

/// Send the full description to the prompt service.
#[tracing::instrument(name = "generate_prompt", skip(state))]
pub async fn generate_prompt(State(state): State<AppState>) -> Json<PromptResponse> {
    let description = state
        .composer()
        .lock()
        .await
        .description(DescriptionStyle::Full);
    let prompt = prompt_or_placeholder(state.collaborators().prompt.as_ref(), &description).await;
    Json(PromptResponse { prompt })
}

/// Compute a saliency map of the snapshot.
///
/// # Errors
///
/// `500` if the snapshot cannot be rendered. Service failures are reported
/// as `502` with an `{error}` body.
#[tracing::instrument(name = "saliency", skip(state))]
pub async fn saliency(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ImageReply>), ApiError> {
    let snapshot = take_snapshot(&state).await?;
    let result = state.collaborators().saliency.process(&snapshot).await;
    Ok(image_reply("saliency", result))
}

/// Synthesize a new image from the snapshot and a prompt.
///
/// # Errors
///
/// `400` if the prompt is too long, `500` if the snapshot cannot be
/// rendered. Service failures are reported as `502` with an `{error}` body.
#[tracing::instrument(name = "synthesize", skip(state, request))]
pub async fn synthesize(
    State(state): State<AppState>,
    Json(request): Json<SynthesizeRequest>,
) -> Result<(StatusCode, Json<ImageReply>), ApiError> {
    validate_prompt(&request.prompt)?;
    let snapshot = take_snapshot(&state).await?;
    let result = state
        .collaborators()
        .synthesis
        .synthesize(&request.prompt, &snapshot)
        .await;
    Ok(image_reply("synthesis", result))
}

fn image_reply(
    service: &'static str,
    result: Result<Vec<u8>, crate::CollaboratorError>,
) -> (StatusCode, Json<ImageReply>) {
    match result {
        Ok(bytes) => {
            metrics::record_collaborator_call(service, true);
            let mime = match ImageFormat::from_magic_bytes(&bytes) {
                ImageFormat::Unknown => ExportFormat::Png.mime(),
                format => format.mime(),
            };
            let image = to_data_uri(&bytes, mime);
            (StatusCode::OK, Json(ImageReply::Image { image }))
        }
        Err(err) => {
            metrics::record_collaborator_call(service, false);
            tracing::warn!("{service} failed: {err}");
            let error = err.to_string();
            (StatusCode::BAD_GATEWAY, Json(ImageReply::Error { error }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use scrapbook_renderer::encode_png;
    use tiny_skia::{Color, Pixmap};
    use tower::ServiceExt;

    use crate::collaborators::{
        CollaboratorError, Collaborators, GreyscaleSaliency, ImageSynthesizer, PromptGenerator,
    };

    struct EchoPrompt;

    #[async_trait]
    impl PromptGenerator for EchoPrompt {
        async fn generate(&self, description: &str) -> Result<String, CollaboratorError> {
            Ok(format!("echo: {description}"))
        }
    }

    struct Unavailable;

    #[async_trait]
    impl ImageSynthesizer for Unavailable {
        async fn synthesize(&self, _: &str, _: &[u8]) -> Result<Vec<u8>, CollaboratorError> {
            Err(CollaboratorError::NotConfigured("synthesis"))
        }
    }

    fn state() -> AppState {
        AppState::new(Collaborators {
            prompt: Arc::new(EchoPrompt),
            saliency: Arc::new(GreyscaleSaliency),
            synthesis: Arc::new(Unavailable),
        })
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut pixmap = Pixmap::new(width, height).expect("pixmap");
        pixmap.fill(Color::from_rgba8(0, 128, 255, 255));
        encode_png(&pixmap).expect("png")
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = crate::router(state.clone())
            .oneshot(request)
            .await
            .expect("response");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, body.to_vec())
    }

    fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn upload(state: &AppState, bytes: Vec<u8>) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/layers")
            .body(Body::from(bytes))
            .expect("request");
        send(state, request).await
    }

    #[tokio::test]
    async fn test_upload_then_list() {
        let state = state();
        let (status, body) = upload(&state, png(100, 50)).await;
        assert_eq!(status, StatusCode::CREATED);
        let summary: LayerSummary = serde_json::from_slice(&body).expect("summary");
        assert_eq!((summary.x, summary.y, summary.depth), (300, 200, 0));

        let (status, body) = send(
            &state,
            Request::get("/api/layers").body(Body::empty()).expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let listing: LayersResponse = serde_json::from_slice(&body).expect("listing");
        assert_eq!(listing.layers.len(), 1);
        assert_eq!(listing.selected, None);
    }

    #[tokio::test]
    async fn test_undecodable_upload_is_422() {
        let state = state();
        let (status, body) = upload(&state, b"not an image".to_vec()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(String::from_utf8_lossy(&body).contains("error"));
        assert!(state.composer().lock().await.scene().is_empty());
    }

    #[tokio::test]
    async fn test_empty_upload_is_400() {
        let state = state();
        let (status, _) = upload(&state, Vec::new()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_long_caption_rejected_and_scene_unchanged() {
        let state = state();
        upload(&state, png(10, 10)).await;
        let caption = "x".repeat(crate::validation::MAX_CAPTION_LEN + 1);
        let (status, _) = send(
            &state,
            json_request(
                "PUT",
                "/api/layers/1/caption",
                &serde_json::json!({ "caption": caption }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let composer = state.composer().lock().await;
        assert_eq!(composer.scene().get(LayerId::new(1)).expect("layer").caption(), "");
    }

    #[tokio::test]
    async fn test_caption_and_description() {
        let state = state();
        upload(&state, png(10, 10)).await;
        let (status, _) = send(
            &state,
            json_request(
                "PUT",
                "/api/layers/1/caption",
                &serde_json::json!({ "caption": "cat" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(
            &state,
            Request::get("/api/description").body(Body::empty()).expect("request"),
        )
        .await;
        assert_eq!(
            String::from_utf8(body).expect("utf8"),
            "Image Data:\nImage ID: 1, X: 300, Y: 200, Caption: \"cat\", Z-Index: 0"
        );

        let (_, body) = send(
            &state,
            Request::get("/api/description?style=coordinates")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert!(!String::from_utf8(body).expect("utf8").contains("Caption"));
    }

    #[tokio::test]
    async fn test_delete_absent_is_204() {
        let state = state();
        let request = Request::delete("/api/layers/42")
            .body(Body::empty())
            .expect("request");
        let (status, _) = send(&state, request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_select_absent_is_404() {
        let state = state();
        let request = Request::post("/api/layers/9/select")
            .body(Body::empty())
            .expect("request");
        let (status, _) = send(&state, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pointer_drag() {
        let state = state();
        upload(&state, png(40, 40)).await;

        let (status, body) = send(
            &state,
            json_request(
                "POST",
                "/api/pointer",
                &serde_json::json!({ "type": "down", "x": 300.0, "y": 200.0 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let outcome: PointerOutcome = serde_json::from_slice(&body).expect("outcome");
        assert!(matches!(outcome.gesture, GestureState::Dragging { .. }));
        assert!(outcome.redraw);

        send(
            &state,
            json_request(
                "POST",
                "/api/pointer",
                &serde_json::json!({ "type": "move", "x": 150.0, "y": 75.0 }),
            ),
        )
        .await;
        send(
            &state,
            json_request("POST", "/api/pointer", &serde_json::json!({ "type": "up" })),
        )
        .await;

        let composer = state.composer().lock().await;
        let layer = composer.scene().get(LayerId::new(1)).expect("layer");
        assert!((layer.position().x - 150.0).abs() < f32::EPSILON);
        assert!((layer.position().y - 75.0).abs() < f32::EPSILON);
        assert!(composer.gesture().is_idle());
    }

    #[tokio::test]
    async fn test_reorder_selected() {
        let state = state();
        upload(&state, png(10, 10)).await;
        upload(&state, png(10, 10)).await;
        send(
            &state,
            Request::post("/api/layers/1/select")
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        let (_, body) = send(
            &state,
            json_request("POST", "/api/reorder", &serde_json::json!({ "direction": "up" })),
        )
        .await;
        let listing: LayersResponse = serde_json::from_slice(&body).expect("listing");
        let order: Vec<u64> = listing.layers.iter().map(|l| l.id.get()).collect();
        assert_eq!(order, vec![2, 1]);
        assert_eq!(listing.selected, Some(LayerId::new(1)));
    }

    #[tokio::test]
    async fn test_prompt_uses_full_description() {
        let state = state();
        let (status, body) = send(
            &state,
            Request::post("/api/prompt").body(Body::empty()).expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let reply: PromptResponse = serde_json::from_slice(&body).expect("prompt");
        assert_eq!(reply.prompt, "echo: Image Data:");
    }

    #[tokio::test]
    async fn test_saliency_returns_data_uri() {
        let state = state();
        upload(&state, png(20, 20)).await;
        let (status, body) = send(
            &state,
            Request::post("/api/saliency").body(Body::empty()).expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let reply: ImageReply = serde_json::from_slice(&body).expect("reply");
        match reply {
            ImageReply::Image { image } => assert!(image.starts_with("data:image/png;base64,")),
            ImageReply::Error { error } => panic!("unexpected error: {error}"),
        }
    }

    #[tokio::test]
    async fn test_synthesis_unavailable_is_placeholder() {
        let state = state();
        let (status, body) = send(
            &state,
            json_request("POST", "/api/synthesize", &serde_json::json!({ "prompt": "a cat" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let reply: ImageReply = serde_json::from_slice(&body).expect("reply");
        assert_eq!(
            reply,
            ImageReply::Error {
                error: "synthesis unavailable".into()
            }
        );
    }

    #[tokio::test]
    async fn test_render_and_snapshot_are_png() {
        let state = state();
        upload(&state, png(10, 10)).await;
        for uri in ["/api/render.png", "/api/snapshot.png"] {
            let (status, body) =
                send(&state, Request::get(uri).body(Body::empty()).expect("request")).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.starts_with(&[0x89, 0x50, 0x4E, 0x47]));
        }
    }
}
