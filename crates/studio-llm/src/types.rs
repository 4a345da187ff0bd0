//! Core types for the completion gateway

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::LlmError;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input
    User,
    /// Assistant response
    Assistant,
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new message
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Input to one completion exchange
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt applied to the whole conversation
    pub system: String,
    /// Ordered conversation messages
    pub messages: Vec<Message>,
    /// Output token budget for this request
    pub max_tokens: u32,
    /// Model override; empty means the backend default
    pub model: String,
}

impl CompletionRequest {
    /// Create a new completion request
    #[must_use]
    pub fn new(system: impl Into<String>, messages: Vec<Message>, max_tokens: u32) -> Self {
        Self {
            system: system.into(),
            messages,
            max_tokens,
            model: String::new(),
        }
    }

    /// Override the model for this request
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Why the service stopped generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model finished its turn
    EndTurn,
    /// The output token budget was exhausted mid-response
    MaxTokens,
    /// A configured stop sequence was hit
    StopSequence,
    /// Any other provider-reported reason
    #[serde(untagged)]
    Other(String),
}

impl StopReason {
    /// Map a provider stop-reason string to the enum
    #[must_use]
    pub fn from_provider(value: &str) -> Self {
        match value {
            "end_turn" => Self::EndTurn,
            "max_tokens" => Self::MaxTokens,
            "stop_sequence" => Self::StopSequence,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One gateway response
///
/// Immutable once produced; consumers reference it, never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// Raw response text
    pub content: String,
    /// Model that actually served the request
    pub model: String,
    /// Input tokens consumed
    pub tokens_input: u64,
    /// Output tokens generated
    pub tokens_output: u64,
    /// Why the service stopped generating
    pub stop_reason: StopReason,
}

impl Completion {
    /// Whether the response stopped because the output budget ran out
    ///
    /// A truncated response is not an error; the orchestrator repairs it
    /// with continuation requests.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.stop_reason == StopReason::MaxTokens
    }
}

/// Trait for completion backend implementations
///
/// The single capability the pipeline needs from an LLM-like service: issue
/// one completion for a prompt plus conversation and report text, usage,
/// and truncation status. Backends are stateless with respect to the
/// pipeline; no session state is carried between calls.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Issue one completion exchange
    ///
    /// Implementations may apply their own low-level retry/backoff for
    /// retryable transport failures, but must observe `cancel` at every
    /// suspension point and return `LlmError::Cancelled` without retrying
    /// once cancellation is seen.
    ///
    /// # Errors
    ///
    /// Returns `LlmError` for transport, auth, quota, outage, timeout, or
    /// cancellation failures.
    async fn complete(
        &self,
        request: CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<Completion, LlmError>;
}
