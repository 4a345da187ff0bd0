//! Code validation for the orchestrator

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use studio_compiler::{CompileGate, CompileOptions};

use crate::error::EngineError;

/// Verdict of one validation pass
#[derive(Debug, Clone)]
pub struct Validation {
    /// Whether the code was accepted
    pub ok: bool,
    /// Diagnostics for a rejection, in output order
    pub diagnostics: Vec<String>,
}

/// Capability to validate generated code
///
/// Kept separate from the compile gate so orchestrator tests can script
/// accept/reject sequences without any process dependency.
#[async_trait]
pub trait CodeValidator: Send + Sync {
    /// Validate one code text
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for infrastructure failures; a rejection is a
    /// successful call with `ok == false`.
    async fn validate(
        &self,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<Validation, EngineError>;
}

/// Validator backed by the compile gate
///
/// Compiles the candidate under a scratch output name; error diagnostics
/// become the validation verdict.
pub struct CompileValidator<'a> {
    gate: &'a dyn CompileGate,
    options: CompileOptions,
    output_name: String,
}

impl<'a> CompileValidator<'a> {
    /// Create a validator that compiles into the given options' work dir
    pub fn new(gate: &'a dyn CompileGate, options: CompileOptions, output_name: impl Into<String>) -> Self {
        Self {
            gate,
            options,
            output_name: output_name.into(),
        }
    }
}

#[async_trait]
impl CodeValidator for CompileValidator<'_> {
    async fn validate(
        &self,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<Validation, EngineError> {
        let outcome = self
            .gate
            .compile(code, &self.output_name, &self.options, cancel)
            .await?;

        Ok(Validation {
            ok: outcome.success,
            diagnostics: outcome.errors,
        })
    }
}
