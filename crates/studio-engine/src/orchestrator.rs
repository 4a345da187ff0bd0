//! The turn orchestrator: one "ask the model for an artifact" operation
//!
//! Drives a single logical generation through bounded retries. Three
//! failure modes are detected and repaired independently:
//!
//! - **Truncation** is repaired inside an attempt by continuation requests;
//!   it never consumes the retry budget.
//! - **Malformed structure** and **validation failure** are repaired across
//!   attempts by corrective re-prompting: the conversation is cumulative, so
//!   the model sees its own prior output and a correction specific to the
//!   failure kind.
//!
//! With retry budget R, at most R+1 attempts are performed. Attempts are
//! strictly sequential; attempt N+1 never starts before attempt N's outcome
//! (including any continuation sub-loop) is fully resolved.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use studio_config::BudgetConfig;
use studio_llm::{Completion, CompletionBackend, CompletionRequest, Message};

use crate::error::EngineError;
use crate::interpret::Interpreter;
use crate::prompts::{CONTINUE_INSTRUCTION, validation_correction};
use crate::validate::CodeValidator;

/// Successful result of one orchestrator invocation
#[derive(Debug)]
pub struct Turn<T> {
    /// The parsed output
    pub output: T,
    /// The final gateway completion of the successful attempt
    pub completion: Completion,
    /// Attempts consumed (1 ..= R+1)
    pub attempts: u32,
}

/// Drives one generation operation through bounded retries
pub struct TurnOrchestrator<'a> {
    gateway: &'a dyn CompletionBackend,
    budgets: BudgetConfig,
    max_tokens: u32,
    cancel: CancellationToken,
}

impl<'a> TurnOrchestrator<'a> {
    /// Create an orchestrator over the given gateway
    ///
    /// Budgets are explicit parameters, never ambient state; tests run with
    /// small budgets.
    pub fn new(
        gateway: &'a dyn CompletionBackend,
        budgets: BudgetConfig,
        max_tokens: u32,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            gateway,
            budgets,
            max_tokens,
            cancel,
        }
    }

    /// Run one generation operation to a parsed output or terminal failure
    ///
    /// The conversation starts from `user_message` and accumulates the
    /// assistant's failed outputs plus corrective instructions across
    /// attempts. On success the output and final completion are returned
    /// immediately; no further attempts are consumed.
    ///
    /// # Errors
    ///
    /// - `EngineError::Llm` when the gateway fails fatally
    /// - `EngineError::MalformedResponse` when structural retries exhaust
    /// - `EngineError::ValidationFailed` when validation retries exhaust
    /// - `EngineError::Cancelled` once cancellation is observed
    pub async fn run<I: Interpreter>(
        &self,
        system_prompt: &str,
        user_message: &str,
        interpreter: &I,
        validator: Option<&dyn CodeValidator>,
    ) -> Result<Turn<I::Output>, EngineError> {
        let mut conversation = vec![Message::user(user_message)];
        let mut attempt: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            let (content, completion) = self
                .complete_with_continuation(system_prompt, &conversation)
                .await?;

            let output = match interpreter.interpret(&content) {
                Ok(output) => output,
                Err(error) => {
                    if attempt < self.budgets.max_retries {
                        warn!(
                            attempt = attempt + 1,
                            allowed = self.budgets.max_retries + 1,
                            %error,
                            "Malformed response, re-prompting"
                        );
                        let instruction = interpreter.corrective_instruction(&error);
                        conversation.push(Message::assistant(content));
                        conversation.push(Message::user(instruction));
                        attempt += 1;
                        continue;
                    }
                    return Err(EngineError::MalformedResponse {
                        attempts: attempt + 1,
                        source: error,
                        last_response: content,
                    });
                }
            };

            if let Some(validator) = validator {
                let verdict = validator
                    .validate(interpreter.code_of(&output), &self.cancel)
                    .await?;
                if !verdict.ok {
                    if attempt < self.budgets.max_retries {
                        warn!(
                            attempt = attempt + 1,
                            allowed = self.budgets.max_retries + 1,
                            diagnostics = verdict.diagnostics.len(),
                            "Validation failed, re-prompting with diagnostics"
                        );
                        conversation.push(Message::assistant(content));
                        conversation.push(Message::user(validation_correction(&verdict.diagnostics)));
                        attempt += 1;
                        continue;
                    }
                    return Err(EngineError::ValidationFailed {
                        attempts: attempt + 1,
                        diagnostics: verdict.diagnostics,
                    });
                }
            }

            return Ok(Turn {
                output,
                completion,
                attempts: attempt + 1,
            });
        }
    }

    /// Obtain a completion, repairing truncation with continuation requests
    ///
    /// While the service stops for output-budget reasons and the
    /// continuation budget C is not exhausted, the partial content is
    /// appended as an assistant message followed by a fixed continuation
    /// instruction, and the gateway is re-invoked; the new content is
    /// appended to the accumulated text. Continuations are intra-attempt
    /// repair of a transport-level limitation and never count against the
    /// retry budget. If C continuations leave the response still truncated,
    /// the possibly-incomplete text proceeds to parsing anyway.
    async fn complete_with_continuation(
        &self,
        system_prompt: &str,
        conversation: &[Message],
    ) -> Result<(String, Completion), EngineError> {
        let request =
            CompletionRequest::new(system_prompt, conversation.to_vec(), self.max_tokens);
        let mut completion = self.gateway.complete(request, &self.cancel).await?;
        debug!(
            tokens_input = completion.tokens_input,
            tokens_output = completion.tokens_output,
            "Completion received"
        );

        let mut content = completion.content.clone();
        if !completion.truncated() {
            return Ok((content, completion));
        }

        warn!("Response truncated, requesting continuation");

        for issued in 0..self.budgets.max_continuations {
            let mut continued = conversation.to_vec();
            continued.push(Message::assistant(content.clone()));
            continued.push(Message::user(CONTINUE_INSTRUCTION));

            let request =
                CompletionRequest::new(system_prompt, continued, self.max_tokens);
            let next = self.gateway.complete(request, &self.cancel).await?;
            debug!(
                tokens_input = next.tokens_input,
                tokens_output = next.tokens_output,
                "Continuation received"
            );

            content.push_str(&next.content);
            let finished = !next.truncated();
            completion = next;

            if finished {
                debug!("Continuation complete");
                break;
            }

            if issued + 1 == self.budgets.max_continuations {
                warn!("Continuation budget exhausted, response may be incomplete");
            }
        }

        Ok((content, completion))
    }
}
