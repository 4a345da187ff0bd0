//! Error taxonomy for the completion gateway

use std::time::Duration;
use thiserror::Error;

/// Errors produced by completion backends
///
/// The pipeline core interprets these only as "retryable" vs "fatal":
/// retryable failures are retried with backoff at the gateway boundary up to
/// a fixed count, everything else aborts immediately.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Backend construction or configuration problem
    #[error("LLM misconfiguration: {0}")]
    Misconfiguration(String),

    /// Network or protocol failure
    #[error("LLM transport error: {0}")]
    Transport(String),

    /// Authentication rejected by the provider
    #[error("LLM provider auth error: {0}")]
    ProviderAuth(String),

    /// Request rejected by the provider (non-retryable HTTP-class error)
    #[error("LLM invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit or quota exhaustion
    #[error("LLM provider quota error: {0}")]
    ProviderQuota(String),

    /// Provider-side outage (5xx)
    #[error("LLM provider outage: {0}")]
    ProviderOutage(String),

    /// Request exceeded its timeout
    #[error("LLM request timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Cancellation observed at a suspension point
    #[error("LLM request cancelled")]
    Cancelled,
}

impl LlmError {
    /// Whether the gateway's low-level retry policy may retry this failure
    ///
    /// Cancellation and non-retryable HTTP-class errors (auth rejection,
    /// malformed requests) are fatal; outages, rate limits, timeouts, and
    /// network failures are retried with backoff.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_)
            | Self::ProviderQuota(_)
            | Self::ProviderOutage(_)
            | Self::Timeout { .. } => true,
            Self::Misconfiguration(_)
            | Self::ProviderAuth(_)
            | Self::InvalidRequest(_)
            | Self::Cancelled => false,
        }
    }
}
