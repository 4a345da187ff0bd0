//! The studio: phase sequencing for one sketch generation
//!
//! Sequences Planning → contour compile → section expansion → final compile,
//! translating orchestrator and coordinator outcomes into a persisted result
//! or a terminal failure. Each phase emits a banner, timing, and either the
//! compiled artifact's path or the diagnostic list. Partial artifacts are
//! preserved on disk; a degraded sketch is more useful than none.

use std::collections::HashMap;
use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use studio_compiler::{CompileGate, CompileOptions, CompileOutcome};
use studio_config::StudioConfig;
use studio_extraction::SketchPlan;
use studio_llm::CompletionBackend;

use crate::error::EngineError;
use crate::interpret::{ArtifactInterpreter, PlanInterpreter};
use crate::naming::{sanitize, truncate_for_log};
use crate::orchestrator::TurnOrchestrator;
use crate::prompts;
use crate::sections::{SectionCoordinator, SectionOutcome};
use crate::validate::CompileValidator;

/// An incoming request to generate a sketch
#[derive(Debug, Clone)]
pub struct SketchRequest {
    /// Natural-language description of the sketch
    pub description: String,
    /// Source handle the request came from, if any
    pub requested_by: Option<String>,
    /// When the request was created
    pub created_at: DateTime<Utc>,
}

impl SketchRequest {
    /// Create a request for the given description
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            requested_by: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the source handle
    #[must_use]
    pub fn with_requested_by(mut self, handle: impl Into<String>) -> Self {
        self.requested_by = Some(handle.into());
        self
    }
}

/// High-level metadata about a generated sketch
#[derive(Debug, Clone)]
pub struct SketchSummary {
    pub title: String,
    pub summary: String,
    pub subject: String,
    pub perspective: String,
    pub style: String,
    /// Free-form metadata left to the model (lighting, mood, ...)
    pub metadata: HashMap<String, String>,
}

impl SketchSummary {
    fn from_plan(plan: &SketchPlan) -> Self {
        Self {
            title: plan.title.clone(),
            summary: plan.summary.clone(),
            subject: plan.subject.clone(),
            perspective: plan.perspective.clone(),
            style: plan.style.clone(),
            metadata: plan.metadata.clone(),
        }
    }
}

/// The completed result of one generation run
#[derive(Debug)]
pub struct GeneratedSketch {
    /// Plan metadata
    pub summary: SketchSummary,
    /// Per-section incorporated/skipped report (empty in single-shot mode)
    pub sections: Vec<SectionOutcome>,
    /// The contour skeleton (empty in single-shot mode)
    pub contours: String,
    /// The final combined code
    pub combined: String,
    /// Directory the sketch's files were written to
    pub output_dir: Utf8PathBuf,
    /// Outcome of the final whole-artifact compile
    pub final_outcome: CompileOutcome,
}

/// Orchestrates the sketch generation process
pub struct Studio {
    config: StudioConfig,
    lang_spec: String,
    gateway: Box<dyn CompletionBackend>,
    gate: Box<dyn CompileGate>,
}

impl Studio {
    /// Create a studio over the given collaborators
    #[must_use]
    pub fn new(
        config: StudioConfig,
        lang_spec: impl Into<String>,
        gateway: Box<dyn CompletionBackend>,
        gate: Box<dyn CompileGate>,
    ) -> Self {
        Self {
            config,
            lang_spec: lang_spec.into(),
            gateway,
            gate,
        }
    }

    /// Generate a sketch through the decomposed pipeline
    ///
    /// Planning → contour compile → section expansion → final compile. The
    /// contour must compile or the run fails; section failures are isolated
    /// and reported. The final compile is reported but does not gate the
    /// run beyond the per-section reporting already performed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for terminal failures: planning exhaustion,
    /// contour rejection, gateway failure, or cancellation.
    pub async fn generate(
        &self,
        request: &SketchRequest,
        cancel: CancellationToken,
    ) -> Result<GeneratedSketch, EngineError> {
        let started = Instant::now();
        banner("Starting sketch generation");
        info!("Description: {}", truncate_for_log(&request.description, 200));
        if let Some(from) = &request.requested_by {
            info!("Requested by: {from}");
        }
        debug!("Request created at {}", request.created_at);

        let orchestrator = TurnOrchestrator::new(
            self.gateway.as_ref(),
            self.config.budgets,
            self.config.llm.max_tokens,
            cancel.clone(),
        );

        // Phase 1: plan the sketch
        phase(1, "Planning");
        let phase_started = Instant::now();
        let plan_turn = orchestrator
            .run(
                &prompts::plan_system_prompt(&self.lang_spec),
                &prompts::plan_user_prompt(&request.description),
                &PlanInterpreter,
                None,
            )
            .await?;
        let plan = plan_turn.output;

        let sketch_dir = sanitize(&plan.title);
        let output_dir = self.config.output.dir.join(&sketch_dir);

        info!("Title: {}", plan.title);
        info!("Output folder: {sketch_dir}");
        info!("Summary: {}", truncate_for_log(&plan.summary, 100));
        info!("Sections: {}", plan.sections.len());
        for section in &plan.sections {
            info!(
                "  - {}: {}",
                section.title,
                truncate_for_log(&section.description, 60)
            );
        }
        info!(
            "Planning done in {:?} ({} attempts)",
            phase_started.elapsed(),
            plan_turn.attempts
        );

        if self.config.verbose {
            persist(
                &output_dir.join("plan_raw.txt"),
                &plan_turn.completion.content,
            )?;
        }

        // Phase 2: the contour skeleton must compile; without it, section
        // expansion has nothing to align to
        phase(2, "Compiling Contours");
        let options = CompileOptions::full().in_subdir(&sketch_dir);
        let contour_outcome = self
            .gate
            .compile(&plan.contour_code, "contours", &options, &cancel)
            .await?;
        log_compilation("contours", &contour_outcome);

        if !contour_outcome.success {
            let failed_path = output_dir.join("contours_failed.sketch");
            persist(&failed_path, &plan.contour_code)?;
            warn!("Failed contour code saved to: {failed_path}");
            return Err(EngineError::ContourRejected {
                diagnostics: contour_outcome.errors,
            });
        }

        // Phase 3: expand each section against the accumulated whole
        phase(3, "Expanding Sections");
        let coordinator = SectionCoordinator::new(
            &orchestrator,
            self.gate.as_ref(),
            &self.lang_spec,
            sketch_dir.clone(),
            cancel.clone(),
        );
        let accumulated = coordinator.run(&plan).await?;
        info!(
            "Sections incorporated: {}/{}",
            accumulated.incorporated_count(),
            accumulated.sections.len()
        );

        if self.config.verbose {
            for outcome in &accumulated.sections {
                if outcome.incorporated {
                    continue;
                }
                if let Some(fragment) = &outcome.fragment {
                    let failed_path = output_dir
                        .join(format!("expanded_{}_failed.sketch", sanitize(&outcome.title)));
                    persist(&failed_path, fragment)?;
                    warn!("Failed section fragment saved to: {failed_path}");
                }
            }
        }

        // Phase 4: final whole-artifact compile; reported, not gating
        phase(4, "Final Compilation");
        let final_outcome = self
            .gate
            .compile(&accumulated.combined, "final", &options, &cancel)
            .await?;
        log_compilation("final", &final_outcome);

        banner("Generation Complete");
        info!("Total time: {:?}", started.elapsed());
        info!("Output folder: {output_dir}");
        if let Some(svg) = &final_outcome.svg_path {
            info!("Final SVG: {svg}");
        }

        Ok(GeneratedSketch {
            summary: SketchSummary::from_plan(&plan),
            sections: accumulated.sections,
            contours: plan.contour_code.clone(),
            combined: accumulated.combined,
            output_dir,
            final_outcome,
        })
    }

    /// Generate a sketch in one validated request, without decomposition
    ///
    /// One orchestrator invocation with the compile gate as validator: the
    /// model's complete sketch is re-prompted with compiler diagnostics
    /// until it compiles or the retry budget exhausts.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for structural or validation exhaustion,
    /// gateway failure, or cancellation.
    pub async fn generate_single(
        &self,
        request: &SketchRequest,
        cancel: CancellationToken,
    ) -> Result<GeneratedSketch, EngineError> {
        let started = Instant::now();
        banner("Starting single-shot sketch generation");
        info!("Description: {}", truncate_for_log(&request.description, 200));

        let orchestrator = TurnOrchestrator::new(
            self.gateway.as_ref(),
            self.config.budgets,
            self.config.llm.max_tokens,
            cancel.clone(),
        );

        let validator = CompileValidator::new(
            self.gate.as_ref(),
            CompileOptions::full().in_subdir("_validate"),
            "validate",
        );

        let turn = orchestrator
            .run(
                &prompts::single_system_prompt(&self.lang_spec),
                &request.description,
                &ArtifactInterpreter,
                Some(&validator),
            )
            .await?;
        let artifact = turn.output;

        let sketch_dir = sanitize(&artifact.title);
        let output_dir = self.config.output.dir.join(&sketch_dir);
        info!("Title: {} ({} attempts)", artifact.title, turn.attempts);

        if self.config.verbose {
            persist(
                &output_dir.join("sketch_raw.txt"),
                &turn.completion.content,
            )?;
        }

        let options = CompileOptions::full().in_subdir(&sketch_dir);
        let final_outcome = self
            .gate
            .compile(&artifact.code, "final", &options, &cancel)
            .await?;
        log_compilation("final", &final_outcome);

        banner("Generation Complete");
        info!("Total time: {:?}", started.elapsed());
        info!("Output folder: {output_dir}");

        Ok(GeneratedSketch {
            summary: SketchSummary {
                title: artifact.title,
                summary: artifact.summary,
                subject: artifact.metadata.get("subject").cloned().unwrap_or_default(),
                perspective: artifact
                    .metadata
                    .get("perspective")
                    .cloned()
                    .unwrap_or_default(),
                style: artifact.metadata.get("style").cloned().unwrap_or_default(),
                metadata: artifact.metadata,
            },
            sections: Vec::new(),
            contours: String::new(),
            combined: artifact.code,
            output_dir,
            final_outcome,
        })
    }
}

/// Write a file, creating parent directories as needed
fn persist(path: &Utf8Path, content: &str) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| EngineError::Persist {
            path: parent.to_string(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| EngineError::Persist {
        path: path.to_string(),
        source,
    })
}

fn banner(message: &str) {
    info!("═══════════════════════════════════════════════════════════════");
    info!("{message}");
    info!("═══════════════════════════════════════════════════════════════");
}

fn phase(number: u8, name: &str) {
    info!("");
    info!("PHASE {number}: {name}");
    info!("─────────────────────────────────────────────────────────────────");
}

fn log_compilation(name: &str, outcome: &CompileOutcome) {
    if outcome.success {
        info!(
            "Compilation '{name}' succeeded{}",
            outcome
                .svg_path
                .as_ref()
                .map(|p| format!(" -> {p}"))
                .unwrap_or_default()
        );
        for warning in &outcome.warnings {
            warn!("  {warning}");
        }
    } else {
        warn!("Compilation '{name}' failed:");
        for error in &outcome.errors {
            warn!("  {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{GateStep, MockBackend, MockGate, completion};
    use studio_llm::LlmError;

    const PLAN_RESPONSE: &str = r"<plan>
<title>Test Harbor</title>
<summary>Boats at rest.</summary>
<subject>harbor</subject>
<perspective>aerial</perspective>
<style>minimalist</style>
<sections>
<section>
<title>Pier</title>
<description>The wooden pier</description>
<neighbors>Water</neighbors>
</section>
<section>
<title>Water</title>
<description>Rippled water</description>
<neighbors>Pier</neighbors>
</section>
</sections>
</plan>
<contours>
# contour
trace dot at origin
</contours>";

    fn studio(backend: MockBackend, gate: MockGate, output_dir: &std::path::Path) -> Studio {
        let mut config = StudioConfig::minimal_for_testing();
        config.budgets.max_retries = 0;
        config.output.dir = Utf8PathBuf::from_path_buf(output_dir.to_path_buf()).unwrap();
        Studio::new(config, "lang spec", Box::new(backend), Box::new(gate))
    }

    fn fragment(marker: &str) -> Result<studio_llm::Completion, LlmError> {
        Ok(completion(&format!("<code>\nlet {marker} : vec = (2, 2)\n</code>")))
    }

    #[tokio::test]
    async fn test_full_run_sequences_phases() {
        let backend = MockBackend::new(vec![
            Ok(completion(PLAN_RESPONSE)),
            fragment("pier_a"),
            fragment("water_a"),
        ]);
        let gate = MockGate::accepting();

        let dir = tempfile::tempdir().unwrap();
        let studio = studio(backend, gate, dir.path());
        let sketch = studio
            .generate(&SketchRequest::new("a quiet harbor"), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(sketch.summary.title, "Test Harbor");
        assert_eq!(sketch.sections.len(), 2);
        assert!(sketch.sections.iter().all(|s| s.incorporated));
        assert!(sketch.combined.contains("pier_a"));
        assert!(sketch.combined.contains("water_a"));
        assert!(sketch.final_outcome.success);
        assert!(sketch.output_dir.as_str().ends_with("test_harbor"));
    }

    #[tokio::test]
    async fn test_contour_rejection_fails_run() {
        let backend = MockBackend::new(vec![Ok(completion(PLAN_RESPONSE))]);
        let gate = MockGate::new(vec![GateStep::Reject(vec![
            "line 2: unknown command".to_string(),
        ])]);

        let dir = tempfile::tempdir().unwrap();
        let studio = studio(backend, gate, dir.path());
        let error = studio
            .generate(&SketchRequest::new("a quiet harbor"), CancellationToken::new())
            .await
            .unwrap_err();

        match error {
            EngineError::ContourRejected { diagnostics } => {
                assert_eq!(diagnostics, vec!["line 2: unknown command".to_string()]);
            }
            other => panic!("Expected ContourRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_final_compile_failure_does_not_gate() {
        // Contour accepted, both sections accepted, final compile rejected:
        // the run still succeeds and reports the failed final outcome
        let backend = MockBackend::new(vec![
            Ok(completion(PLAN_RESPONSE)),
            fragment("pier_a"),
            fragment("water_a"),
        ]);
        let gate = MockGate::new(vec![
            GateStep::Accept,
            GateStep::Accept,
            GateStep::Accept,
            GateStep::Reject(vec!["final artifact rejected".to_string()]),
        ]);

        let dir = tempfile::tempdir().unwrap();
        let studio = studio(backend, gate, dir.path());
        let sketch = studio
            .generate(&SketchRequest::new("a quiet harbor"), CancellationToken::new())
            .await
            .unwrap();

        assert!(!sketch.final_outcome.success);
        assert_eq!(sketch.sections.len(), 2);
    }

    #[tokio::test]
    async fn test_single_shot_validates_through_gate() {
        let backend = MockBackend::new(vec![
            Ok(completion(
                "<title>Line</title>\n<summary>one line</summary>\n<metadata>\n<subject>line</subject>\n</metadata>\n<code>\ntrace stroke from (0, 0) to (100, 0)\n</code>",
            )),
        ]);
        // First compile is the validator pass, second is the final compile
        let gate = MockGate::new(vec![GateStep::Accept, GateStep::Accept]);

        let dir = tempfile::tempdir().unwrap();
        let studio = studio(backend, gate, dir.path());
        let sketch = studio
            .generate_single(
                &SketchRequest::new("a single straight line"),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(sketch.summary.title, "Line");
        assert_eq!(sketch.summary.subject, "line");
        assert!(sketch.sections.is_empty());
        assert!(sketch.combined.contains("trace stroke"));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_planning() {
        let backend = MockBackend::new(vec![Ok(completion(PLAN_RESPONSE))]);
        let gate = MockGate::accepting();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let dir = tempfile::tempdir().unwrap();
        let studio = studio(backend, gate, dir.path());
        let error = studio
            .generate(&SketchRequest::new("anything"), cancel)
            .await
            .unwrap_err();

        assert!(error.is_cancellation());
    }
}
