//! Command-line and environment configuration.

use std::time::Duration;

use clap::Parser;

use crate::prompt::{DEFAULT_PROMPT_MODEL, DEFAULT_PROMPT_URL};

/// Default port for the composer server.
pub const DEFAULT_PORT: u16 = 9474;

/// Scrapbook Composer server.
#[derive(Debug, Clone, Parser)]
#[command(name = "scrapbook-composer", version, about)]
pub struct ServerArgs {
    /// Port to bind on localhost.
    #[arg(long, env = "SCRAPBOOK_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// API key for the prompt service.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Chat-completions endpoint used for prompt generation.
    #[arg(long, env = "SCRAPBOOK_PROMPT_URL", default_value = DEFAULT_PROMPT_URL)]
    pub prompt_url: String,

    /// Model requested from the prompt service.
    #[arg(long, env = "SCRAPBOOK_PROMPT_MODEL", default_value = DEFAULT_PROMPT_MODEL)]
    pub prompt_model: String,

    /// Image synthesis endpoint. Synthesis is unavailable without it.
    #[arg(long, env = "SCRAPBOOK_SYNTHESIS_URL")]
    pub synthesis_url: Option<String>,

    /// Timeout for downstream requests, in seconds.
    #[arg(long, env = "SCRAPBOOK_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind on localhost.
    pub port: u16,
    /// API key for the prompt service.
    pub openai_api_key: Option<String>,
    /// Chat-completions endpoint.
    pub prompt_url: String,
    /// Prompt model name.
    pub prompt_model: String,
    /// Synthesis endpoint, if any.
    pub synthesis_url: Option<String>,
    /// Timeout for downstream requests.
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            openai_api_key: None,
            prompt_url: DEFAULT_PROMPT_URL.to_string(),
            prompt_model: DEFAULT_PROMPT_MODEL.to_string(),
            synthesis_url: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<ServerArgs> for ServerConfig {
    fn from(args: ServerArgs) -> Self {
        Self {
            port: args.port,
            openai_api_key: args.openai_api_key.filter(|key| !key.trim().is_empty()),
            prompt_url: args.prompt_url,
            prompt_model: args.prompt_model,
            synthesis_url: args.synthesis_url.filter(|url| !url.trim().is_empty()),
            request_timeout: Duration::from_secs(args.request_timeout_secs.max(1)),
        }
    }
}
