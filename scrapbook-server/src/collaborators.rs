//! Seams to the services that consume scene snapshots.
//!
//! The composer never waits on these: handlers take a snapshot, release the
//! session lock and only then call out. A failure becomes placeholder text
//! for the user and never touches the scene.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use scrapbook_renderer::{greyscale_png, RenderError};
use thiserror::Error;

/// Placeholder shown when prompt generation fails.
pub const PROMPT_PLACEHOLDER: &str = "Error generating prompt";

/// Errors raised by downstream services.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The service has no endpoint configured.
    #[error("{0} unavailable")]
    NotConfigured(&'static str),
    /// No API key was supplied for a service that needs one.
    #[error("missing API key for {0}")]
    MissingApiKey(&'static str),
    /// A configured URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed (connection, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("service returned HTTP {0}")]
    Status(u16),
    /// The response did not match the expected structure.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    /// Local image processing failed.
    #[error("image processing failed: {0}")]
    Image(#[from] RenderError),
}

impl CollaboratorError {
    /// Returns true if this error is retryable (transient HTTP failures).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_connect() || err.is_timeout(),
            Self::Status(code) => *code >= 500,
            _ => false,
        }
    }
}

/// Configuration for retry with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Initial delay between retries in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay between retries in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 200,
            max_delay_ms: 2_000,
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        initial_delay_ms: u64,
        max_delay_ms: u64,
        multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
            max_delay_ms,
            multiplier,
        }
    }

    /// A single attempt with no retries.
    #[must_use]
    pub fn none() -> Self {
        Self::new(1, 0, 0, 1.0)
    }

    /// Calculate delay for a given attempt number (0-indexed).
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay_ms as f64 * self.multiplier.powi(attempt as i32);
        Duration::from_millis(base_delay.min(self.max_delay_ms as f64) as u64)
    }
}

/// Send a request, retrying transient failures with backoff.
///
/// `build` is called once per attempt.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted or a non-retryable
/// error is seen. Non-success statuses are reported as
/// [`CollaboratorError::Status`].
pub(crate) async fn send_with_retry<F>(
    service: &'static str,
    retry: &RetryConfig,
    build: F,
) -> Result<Response, CollaboratorError>
where
    F: Fn() -> RequestBuilder,
{
    let attempts = retry.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        let err = match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => CollaboratorError::Status(response.status().as_u16()),
            Err(err) => CollaboratorError::Http(err),
        };

        attempt += 1;
        if !err.is_retryable() || attempt >= attempts {
            return Err(err);
        }
        let delay = retry.delay_for_attempt(attempt - 1);
        tracing::warn!(
            "{service} request failed (attempt {attempt}/{attempts}), retrying in {}ms: {err}",
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
    }
}

/// Build the shared HTTP client.
///
/// # Errors
///
/// Returns [`CollaboratorError::Http`] if the client fails to build.
pub fn http_client(timeout: Duration) -> Result<Client, CollaboratorError> {
    let http = Client::builder()
        .user_agent(concat!("scrapbook-composer/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?;
    Ok(http)
}

/// Turns a scene description into a natural-language prompt.
#[async_trait]
pub trait PromptGenerator: Send + Sync {
    /// Generate a prompt from the full scene description.
    async fn generate(&self, description: &str) -> Result<String, CollaboratorError>;

    /// Whether the generator has what it needs to make requests.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Produces a saliency map from a PNG snapshot.
#[async_trait]
pub trait SaliencyProcessor: Send + Sync {
    /// Return the saliency map as PNG bytes.
    async fn process(&self, snapshot_png: &[u8]) -> Result<Vec<u8>, CollaboratorError>;
}

/// Synthesizes a new image from a snapshot and a prompt.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Return the synthesized image bytes.
    async fn synthesize(
        &self,
        prompt: &str,
        snapshot_png: &[u8],
    ) -> Result<Vec<u8>, CollaboratorError>;

    /// Whether an endpoint is configured.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Local saliency: the greyscale rendition of the snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreyscaleSaliency;

#[async_trait]
impl SaliencyProcessor for GreyscaleSaliency {
    async fn process(&self, snapshot_png: &[u8]) -> Result<Vec<u8>, CollaboratorError> {
        let owned = snapshot_png.to_vec();
        let grey = tokio::task::spawn_blocking(move || greyscale_png(&owned))
            .await
            .map_err(|e| {
                CollaboratorError::UnexpectedResponse(format!("saliency task failed: {e}"))
            })??;
        Ok(grey)
    }
}

/// The set of downstream services a server talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Prompt generation.
    pub prompt: Arc<dyn PromptGenerator>,
    /// Saliency map generation.
    pub saliency: Arc<dyn SaliencyProcessor>,
    /// Image synthesis.
    pub synthesis: Arc<dyn ImageSynthesizer>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("prompt_configured", &self.prompt.is_configured())
            .field("synthesis_configured", &self.synthesis.is_configured())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrapbook_renderer::encode_png;
    use tiny_skia::{Color, Pixmap};

    #[test]
    fn test_retry_delay_backoff() {
        let config = RetryConfig::new(5, 100, 1_000, 2.0);
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        // Capped
        assert_eq!(config.delay_for_attempt(10), Duration::from_millis(1_000));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(CollaboratorError::Status(503).is_retryable());
        assert!(!CollaboratorError::Status(401).is_retryable());
        assert!(!CollaboratorError::NotConfigured("synthesis").is_retryable());
        assert!(!CollaboratorError::UnexpectedResponse("x".into()).is_retryable());
    }

    #[test]
    fn test_not_configured_message() {
        assert_eq!(
            CollaboratorError::NotConfigured("synthesis").to_string(),
            "synthesis unavailable"
        );
    }

    #[tokio::test]
    async fn test_greyscale_saliency() {
        let mut pixmap = Pixmap::new(4, 4).expect("pixmap");
        pixmap.fill(Color::from_rgba8(255, 0, 0, 255));
        let png = encode_png(&pixmap).expect("png");

        let grey = GreyscaleSaliency.process(&png).await.expect("saliency");
        assert!(grey.starts_with(&[0x89, 0x50, 0x4E, 0x47]));
    }

    #[tokio::test]
    async fn test_greyscale_saliency_rejects_garbage() {
        let err = GreyscaleSaliency
            .process(b"not a png")
            .await
            .expect_err("should fail");
        assert!(matches!(err, CollaboratorError::Image(_)));
    }
}
