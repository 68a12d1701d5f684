//! Prompt generation through an OpenAI-compatible chat-completions API.

use async_trait::async_trait;
use reqwest::Client;
use scrapbook_core::{CANVAS_HEIGHT, CANVAS_WIDTH};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::collaborators::{
    send_with_retry, CollaboratorError, PromptGenerator, RetryConfig, PROMPT_PLACEHOLDER,
};
use crate::metrics;

/// Default chat-completions endpoint.
pub const DEFAULT_PROMPT_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Default model name.
pub const DEFAULT_PROMPT_MODEL: &str = "gpt-3.5-turbo";

/// The fixed system instruction sent ahead of every description.
#[must_use]
pub fn system_instruction() -> String {
    format!(
        "You are receiving coordinates of objects as well as a caption describing each object. \
         Reply in natural language describing the positional relationships, for example: \
         image 1, a big round apple, is left of, above, behind or underneath another image. \
         Positions can also be described relative to the canvas itself. \
         The canvas is {CANVAS_WIDTH} wide and {CANVAS_HEIGHT} high."
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// Chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenAiPromptClient {
    http: Client,
    endpoint: Url,
    model: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl OpenAiPromptClient {
    /// Create a client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::InvalidUrl`] if the URL is malformed.
    pub fn new(
        http: Client,
        endpoint: &str,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, CollaboratorError> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| CollaboratorError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            model: model.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
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
impl PromptGenerator for OpenAiPromptClient {
    #[tracing::instrument(name = "generate_prompt", skip_all, fields(model = %self.model))]
    async fn generate(&self, description: &str) -> Result<String, CollaboratorError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CollaboratorError::MissingApiKey("prompt"))?;

        let instruction = system_instruction();
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &instruction,
                },
                ChatMessage {
                    role: "user",
                    content: description,
                },
            ],
        };

        let response = send_with_retry("prompt", &self.retry, || {
            self.http
                .post(self.endpoint.clone())
                .bearer_auth(api_key)
                .json(&body)
        })
        .await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::UnexpectedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CollaboratorError::UnexpectedResponse("no choices".to_string()))
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Generate a prompt, substituting the placeholder on any failure.
pub async fn prompt_or_placeholder(generator: &dyn PromptGenerator, description: &str) -> String {
    match generator.generate(description).await {
        Ok(prompt) => {
            metrics::record_collaborator_call("prompt", true);
            prompt
        }
        Err(err) => {
            metrics::record_collaborator_call("prompt", false);
            tracing::warn!("Prompt generation failed: {err}");
            PROMPT_PLACEHOLDER.to_string()
        }
    }
}
