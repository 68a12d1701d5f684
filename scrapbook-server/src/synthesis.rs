//! Image synthesis over a plain JSON endpoint.
//!
//! Request: `{"prompt": "...", "image": "<base64 PNG>"}`.
//! Response: `{"image": "<base64>"}`; a `data:` URI is accepted too.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::collaborators::{send_with_retry, CollaboratorError, ImageSynthesizer, RetryConfig};

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    prompt: &'a str,
    image: String,
}

#[derive(Debug, Deserialize)]
struct SynthesisResponse {
    image: String,
}

/// HTTP synthesis client. Without an endpoint every call reports
/// "synthesis unavailable".
#[derive(Debug, Clone)]
pub struct HttpSynthesisClient {
    http: Client,
    endpoint: Option<Url>,
    retry: RetryConfig,
}

impl HttpSynthesisClient {
    /// Create a client, optionally bound to an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::InvalidUrl`] if the URL is malformed.
    pub fn new(http: Client, endpoint: Option<&str>) -> Result<Self, CollaboratorError> {
        let endpoint = endpoint
            .map(|raw| Url::parse(raw).map_err(|e| CollaboratorError::InvalidUrl(e.to_string())))
            .transpose()?;
        Ok(Self {
            http,
            endpoint,
            retry: RetryConfig::default(),
        })
    }

    /// Replace the retry configuration.
    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl ImageSynthesizer for HttpSynthesisClient {
    #[tracing::instrument(name = "synthesize", skip_all)]
    async fn synthesize(
        &self,
        prompt: &str,
        snapshot_png: &[u8],
    ) -> Result<Vec<u8>, CollaboratorError> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or(CollaboratorError::NotConfigured("synthesis"))?;

        let body = SynthesisRequest {
            prompt,
            image: base64::engine::general_purpose::STANDARD.encode(snapshot_png),
        };

        let response = send_with_retry("synthesis", &self.retry, || {
            self.http.post(endpoint.clone()).json(&body)
        })
        .await?;

        let parsed: SynthesisResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::UnexpectedResponse(e.to_string()))?;

        decode_image_field(&parsed.image)
    }

    fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

/// Decode a base64 payload, stripping a `data:...;base64,` prefix if present.
fn decode_image_field(field: &str) -> Result<Vec<u8>, CollaboratorError> {
    let encoded = match field.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| CollaboratorError::UnexpectedResponse("malformed data URI".into()))?,
        None => field,
    };
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| CollaboratorError::UnexpectedResponse(format!("invalid base64 image: {e}")))
}
