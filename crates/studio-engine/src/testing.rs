//! Scripted test doubles for the gateway and compile gate
//!
//! The pipeline's control flow is exercised entirely through its capability
//! traits; these doubles replay scripted responses in order and record the
//! inputs they received.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use studio_compiler::{CompileGate, CompileOptions, CompileOutcome, CompilerError};
use studio_llm::{
    Completion, CompletionBackend, CompletionRequest, LlmError, StopReason,
};

use crate::error::EngineError;
use crate::validate::{CodeValidator, Validation};

/// A finished completion with the given content
pub fn completion(content: &str) -> Completion {
    Completion {
        content: content.to_string(),
        model: "mock-model".to_string(),
        tokens_input: 10,
        tokens_output: 20,
        stop_reason: StopReason::EndTurn,
    }
}

/// A truncated completion with the given partial content
pub fn truncated(content: &str) -> Completion {
    Completion {
        stop_reason: StopReason::MaxTokens,
        ..completion(content)
    }
}

/// A well-formed complete-sketch response with the given title
pub fn artifact_response(title: &str) -> Completion {
    completion(&format!(
        "<title>{title}</title>\n<summary>test sketch</summary>\n<code>\ntrace dot at origin\n</code>"
    ))
}

/// Gateway double replaying scripted results in order
///
/// Panics if invoked more times than it has scripted results; records every
/// request for assertions on conversation growth.
pub struct MockBackend {
    script: Mutex<VecDeque<Result<Completion, LlmError>>>,
    recorded: Mutex<Vec<CompletionRequest>>,
}

impl MockBackend {
    pub fn new(script: Vec<Result<Completion, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(
        &self,
        request: CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<Completion, LlmError> {
        if cancel.is_cancelled() {
            return Err(LlmError::Cancelled);
        }
        self.recorded.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("MockBackend script exhausted")
    }
}

/// Validator double replaying scripted verdicts in order
pub struct ScriptedValidator {
    script: Mutex<VecDeque<Validation>>,
}

impl ScriptedValidator {
    pub fn new(script: Vec<Validation>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }
}

#[async_trait]
impl CodeValidator for ScriptedValidator {
    async fn validate(
        &self,
        _code: &str,
        _cancel: &CancellationToken,
    ) -> Result<Validation, EngineError> {
        Ok(self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedValidator script exhausted"))
    }
}

/// One scripted compile result
pub enum GateStep {
    Accept,
    Reject(Vec<String>),
    Crash(String),
}

/// Compile gate double replaying scripted outcomes in order
///
/// Records every compiled source text so tests can assert on candidate
/// assembly.
pub struct MockGate {
    script: Mutex<VecDeque<GateStep>>,
    compiled: Mutex<Vec<(String, String)>>,
}

impl MockGate {
    pub fn new(script: Vec<GateStep>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            compiled: Mutex::new(Vec::new()),
        }
    }

    /// A gate that accepts everything
    pub fn accepting() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            compiled: Mutex::new(Vec::new()),
        }
    }

    /// (output name, source) pairs received so far, in order
    pub fn compiled(&self) -> Vec<(String, String)> {
        self.compiled.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompileGate for MockGate {
    async fn compile(
        &self,
        code: &str,
        output_name: &str,
        _options: &CompileOptions,
        cancel: &CancellationToken,
    ) -> Result<CompileOutcome, CompilerError> {
        if cancel.is_cancelled() {
            return Err(CompilerError::Cancelled);
        }
        self.compiled
            .lock()
            .unwrap()
            .push((output_name.to_string(), code.to_string()));

        // An empty script means accept everything
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(GateStep::Accept);

        match step {
            GateStep::Accept => Ok(CompileOutcome {
                success: true,
                ..CompileOutcome::default()
            }),
            GateStep::Reject(errors) => Ok(CompileOutcome {
                success: false,
                errors,
                ..CompileOutcome::default()
            }),
            GateStep::Crash(reason) => Err(CompilerError::Spawn(std::io::Error::other(reason))),
        }
    }
}
