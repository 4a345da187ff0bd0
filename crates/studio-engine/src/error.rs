//! Error taxonomy for the generation pipeline

use thiserror::Error;

use studio_compiler::CompilerError;
use studio_extraction::ExtractionError;
use studio_llm::LlmError;

/// Terminal failures of the generation pipeline
///
/// Every variant carries enough context (attempt counts, last diagnostics or
/// raw text) to reproduce and debug without re-running.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Gateway failure that exhausted the low-level retry policy
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),

    /// Structural-parse retries exhausted
    #[error("could not obtain well-formed output after {attempts} attempts: {source}")]
    MalformedResponse {
        attempts: u32,
        #[source]
        source: ExtractionError,
        /// Last raw response, preserved for diagnosis
        last_response: String,
    },

    /// Validation retries exhausted
    #[error("validation failed after {attempts} attempts: {}", .diagnostics.join("; "))]
    ValidationFailed {
        attempts: u32,
        diagnostics: Vec<String>,
    },

    /// The contour skeleton did not compile; section expansion has nothing
    /// to align to
    #[error("contour compilation failed: {}", .diagnostics.join("; "))]
    ContourRejected { diagnostics: Vec<String> },

    /// Compile gate infrastructure failure
    #[error("compile gate error: {0}")]
    Compiler(#[from] CompilerError),

    /// Cancellation observed at a suspension point
    #[error("generation cancelled")]
    Cancelled,

    /// Failed to persist an output or diagnostic file
    #[error("failed to persist '{path}': {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// Whether this failure is a cancellation, in any of its carrier forms
    ///
    /// Cancellation is always fatal and immediate; the section coordinator
    /// must unwind instead of recording a skip.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Llm(LlmError::Cancelled) | Self::Compiler(CompilerError::Cancelled)
        )
    }
}
