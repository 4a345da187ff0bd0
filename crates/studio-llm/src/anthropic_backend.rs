//! Anthropic HTTP backend implementation
//!
//! HTTP-based completion backend for Anthropic's Messages API, the
//! production transport behind the `CompletionBackend` capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::LlmError;
use crate::http_client::HttpClient;
use crate::types::{CompletionBackend, CompletionRequest, Completion, Message, Role, StopReason};

/// Default Anthropic API endpoint
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API backend
#[derive(Clone, Debug)]
pub struct AnthropicBackend {
    client: HttpClient,
    base_url: String,
    api_key: String,
    default_model: String,
    temperature: Option<f32>,
    request_timeout: Duration,
    transport_retries: u32,
}

impl AnthropicBackend {
    /// Create a new Anthropic backend
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the HTTP client cannot be
    /// constructed
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        default_model: String,
        temperature: Option<f32>,
        request_timeout: Duration,
        transport_retries: u32,
    ) -> Result<Self, LlmError> {
        let client = HttpClient::new()?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            default_model,
            temperature,
            request_timeout,
            transport_retries,
        })
    }

    /// Create a new Anthropic backend from configuration
    ///
    /// The API key is read from the environment variable named in
    /// `[llm] api_key_env`, unless an explicit key is supplied.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if no API key can be resolved
    /// or the HTTP client cannot be constructed
    pub fn from_config(
        config: &studio_config::StudioConfig,
        explicit_key: Option<String>,
    ) -> Result<Self, LlmError> {
        let api_key = match explicit_key {
            Some(key) if !key.is_empty() => key,
            _ => std::env::var(&config.llm.api_key_env).map_err(|_| {
                LlmError::Misconfiguration(format!(
                    "Anthropic API key not found in environment variable '{}'. \
                     Set this variable, pass --key, or configure a different \
                     api_key_env in [llm].",
                    config.llm.api_key_env
                ))
            })?,
        };

        Self::new(
            api_key,
            config.llm.base_url.clone(),
            config.llm.model.clone(),
            config.llm.temperature,
            Duration::from_secs(config.llm.request_timeout_secs),
            config.budgets.transport_retries,
        )
    }

    /// Resolve the model for this request: request override wins, backend
    /// default otherwise
    fn resolve_model(&self, request: &CompletionRequest) -> String {
        if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        }
    }

    /// Convert conversation messages to the Messages API wire format
    fn convert_messages(messages: &[Message]) -> Vec<AnthropicMessage> {
        messages
            .iter()
            .map(|msg| AnthropicMessage {
                role: match msg.role {
                    Role::User => "user".to_string(),
                    Role::Assistant => "assistant".to_string(),
                },
                content: msg.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    async fn complete(
        &self,
        request: CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<Completion, LlmError> {
        let model = self.resolve_model(&request);

        debug!(
            provider = "anthropic",
            model = %model,
            max_tokens = request.max_tokens,
            messages = request.messages.len(),
            "Invoking Anthropic backend"
        );

        let request_body = AnthropicRequest {
            model: model.clone(),
            messages: Self::convert_messages(&request.messages),
            max_tokens: request.max_tokens,
            temperature: self.temperature,
            system: if request.system.is_empty() {
                None
            } else {
                Some(request.system.clone())
            },
        };

        let http_request = reqwest::Client::new()
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body);

        let response = self
            .client
            .execute_with_retry(
                http_request,
                self.request_timeout,
                "anthropic",
                self.transport_retries,
                cancel,
            )
            .await?;

        let response_body: AnthropicResponse = response.json().await.map_err(|e| {
            LlmError::Transport(format!("Failed to parse Anthropic response: {e}"))
        })?;

        // Concatenate all text content blocks
        let content: String = response_body
            .content
            .iter()
            .filter(|block| block.content_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if content.is_empty() {
            return Err(LlmError::Transport(
                "Anthropic response missing text content".to_string(),
            ));
        }

        let stop_reason = response_body
            .stop_reason
            .as_deref()
            .map_or(StopReason::EndTurn, StopReason::from_provider);

        let (tokens_input, tokens_output) = response_body
            .usage
            .map_or((0, 0), |u| (u.input_tokens, u.output_tokens));

        debug!(
            provider = "anthropic",
            tokens_input,
            tokens_output,
            stop_reason = ?stop_reason,
            "Anthropic invocation completed"
        );

        Ok(Completion {
            content,
            model: response_body.model.unwrap_or(model),
            tokens_input,
            tokens_output,
            stop_reason,
        })
    }
}

/// Anthropic message format for requests
#[derive(Debug, Clone, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

/// Anthropic request body
#[derive(Debug, Clone, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

/// Anthropic response body
#[derive(Debug, Clone, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    model: Option<String>,
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

/// Content block in an Anthropic response
#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

/// Token usage information
#[derive(Debug, Clone, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}
