//! Completion gateway for sketch-studio
//!
//! Trait-based abstraction over LLM completion services. The pipeline
//! depends only on the `CompletionBackend` capability, one operation that
//! issues a completion for a system prompt plus conversation and reports
//! text, token usage, and truncation status. The production transport is
//! the Anthropic Messages API over HTTP; tests substitute scripted
//! in-process backends.

mod anthropic_backend;
mod error;
pub(crate) mod http_client;
mod types;

pub use anthropic_backend::AnthropicBackend;
pub use error::LlmError;
pub use types::{CompletionBackend, CompletionRequest, Completion, Message, Role, StopReason};

use studio_config::StudioConfig;

/// Create a completion backend from configuration
///
/// # Errors
///
/// Returns `LlmError::Misconfiguration` if the API key cannot be resolved
/// or the HTTP transport cannot be constructed.
pub fn backend_from_config(
    config: &StudioConfig,
    explicit_key: Option<String>,
) -> Result<Box<dyn CompletionBackend>, LlmError> {
    let backend = AnthropicBackend::from_config(config, explicit_key)?;
    Ok(Box::new(backend))
}
