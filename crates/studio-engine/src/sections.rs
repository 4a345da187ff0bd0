//! The section coordinator: commit-or-skip expansion of a planned sketch
//!
//! Sections are processed sequentially in plan order; later sections may
//! reference earlier ones as neighbors and are expected to align with
//! already-emitted code, not the reverse. Each section's fragment is
//! tentatively appended to the accumulated artifact and the *entire*
//! candidate is re-validated through the compile gate, because
//! cross-section inconsistencies (duplicate names, misaligned coordinates)
//! surface only at whole-artifact compile time. A failed section is skipped
//! and never disturbs fragments committed before it.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use studio_compiler::{CompileGate, CompileOptions};
use studio_extraction::SketchPlan;

use crate::error::EngineError;
use crate::interpret::FragmentInterpreter;
use crate::naming::sanitize;
use crate::orchestrator::TurnOrchestrator;
use crate::prompts;

/// Separator between the contour skeleton and expanded section code
const EXPANSION_HEADER: &str = "# === EXPANDED DETAILS ===";

/// Per-section result of a coordinator pass
#[derive(Debug, Clone)]
pub struct SectionOutcome {
    /// Section title from the plan
    pub title: String,
    /// Whether the section's fragment was committed
    pub incorporated: bool,
    /// The generated fragment, when expansion produced one
    pub fragment: Option<String>,
    /// Diagnostics for a skipped section
    pub diagnostics: Vec<String>,
}

/// The running combined artifact plus per-section outcomes
///
/// Owned exclusively by the coordinator during a pass; grows monotonically.
#[derive(Debug)]
pub struct AccumulatedArtifact {
    /// Contour skeleton plus every committed fragment, in plan order
    pub combined: String,
    /// One outcome per planned section, in plan order
    pub sections: Vec<SectionOutcome>,
}

impl AccumulatedArtifact {
    /// Number of incorporated sections
    #[must_use]
    pub fn incorporated_count(&self) -> usize {
        self.sections.iter().filter(|s| s.incorporated).count()
    }
}

/// Expands a plan's sections against the accumulated whole
pub struct SectionCoordinator<'a> {
    orchestrator: &'a TurnOrchestrator<'a>,
    gate: &'a dyn CompileGate,
    lang_spec: &'a str,
    compile_subdir: String,
    cancel: CancellationToken,
}

impl<'a> SectionCoordinator<'a> {
    /// Create a coordinator over the given orchestrator and compile gate
    pub fn new(
        orchestrator: &'a TurnOrchestrator<'a>,
        gate: &'a dyn CompileGate,
        lang_spec: &'a str,
        compile_subdir: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            orchestrator,
            gate,
            lang_spec,
            compile_subdir: compile_subdir.into(),
            cancel,
        }
    }

    /// Run exactly one pass over the plan's sections
    ///
    /// Always terminates after one pass; the accumulated artifact is
    /// returned regardless of how many sections were incorporated, paired
    /// with the per-section report. Only cancellation unwinds early.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` only for cancellation; every other per-section
    /// failure is recorded as a skip and isolated from siblings.
    pub async fn run(&self, plan: &SketchPlan) -> Result<AccumulatedArtifact, EngineError> {
        let mut combined = format!("{}\n\n{EXPANSION_HEADER}\n", plan.contour_code);
        let mut sections = Vec::with_capacity(plan.sections.len());

        let system_prompt = prompts::expand_system_prompt(self.lang_spec);

        for (index, section) in plan.sections.iter().enumerate() {
            info!(
                "[{}/{}] Expanding: {}",
                index + 1,
                plan.sections.len(),
                section.title
            );

            for neighbor in &section.neighbors {
                if !plan.sections.iter().any(|s| s.title == *neighbor) {
                    debug!(
                        section = %section.title,
                        neighbor = %neighbor,
                        "Declared neighbor not present in plan"
                    );
                }
            }

            // Alignment context is the original contour, not the growing
            // artifact, so sub-generation prompts stay bounded in size.
            let user_prompt = prompts::expand_user_prompt(plan, section);

            let fragment = match self
                .orchestrator
                .run(&system_prompt, &user_prompt, &FragmentInterpreter, None)
                .await
            {
                Ok(turn) => turn.output,
                Err(err) if err.is_cancellation() => return Err(err),
                Err(err) => {
                    error!(section = %section.title, %err, "Section expansion failed, skipping");
                    sections.push(SectionOutcome {
                        title: section.title.clone(),
                        incorporated: false,
                        fragment: None,
                        diagnostics: vec![err.to_string()],
                    });
                    continue;
                }
            };

            let candidate = format!("{combined}\n\n# Section: {}\n{fragment}", section.title);
            let output_name = format!("expanded_{}", sanitize(&section.title));
            let options = CompileOptions::full().in_subdir(&self.compile_subdir);

            let outcome = match self
                .gate
                .compile(&candidate, &output_name, &options, &self.cancel)
                .await
            {
                Ok(outcome) => outcome,
                Err(err) => {
                    let engine_err = EngineError::from(err);
                    if engine_err.is_cancellation() {
                        return Err(engine_err);
                    }
                    error!(section = %section.title, err = %engine_err, "Compile invocation failed, skipping section");
                    sections.push(SectionOutcome {
                        title: section.title.clone(),
                        incorporated: false,
                        fragment: Some(fragment),
                        diagnostics: vec![engine_err.to_string()],
                    });
                    continue;
                }
            };

            if !outcome.success {
                warn!(
                    section = %section.title,
                    errors = outcome.errors.len(),
                    "Section failed whole-artifact compile, skipping"
                );
                sections.push(SectionOutcome {
                    title: section.title.clone(),
                    incorporated: false,
                    fragment: Some(fragment),
                    diagnostics: outcome.errors,
                });
                continue;
            }

            info!(section = %section.title, svg = ?outcome.svg_path, "Section incorporated");
            combined = candidate;
            sections.push(SectionOutcome {
                title: section.title.clone(),
                incorporated: true,
                fragment: Some(fragment),
                diagnostics: Vec::new(),
            });
        }

        Ok(AccumulatedArtifact { combined, sections })
    }
}
