//! Types for the compile gate

use async_trait::async_trait;
use camino::Utf8PathBuf;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from invoking the external compiler
///
/// These are infrastructure failures; a compile that runs to completion and
/// rejects the source is a `CompileOutcome` with `success == false`, not an
/// error.
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("compiler not found at: {0}")]
    NotFound(String),

    #[error("failed to prepare work directory '{path}': {source}")]
    WorkDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write source file '{path}': {source}")]
    WriteSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run compiler: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("compile invocation cancelled")]
    Cancelled,
}

/// Optional settings for one compile invocation
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Position the drawing at (x, y) in mm
    pub position: Option<(f64, f64)>,
    /// Scale the drawing to fit within (w, h) in mm
    pub size: Option<(f64, f64)>,
    /// Generate an SVG preview
    pub gen_svg: bool,
    /// Generate G-code output
    pub gen_gcode: bool,
    /// Subdirectory within the output directory for this compilation
    pub subdir: Option<String>,
}

impl CompileOptions {
    /// Options that generate both SVG and G-code
    #[must_use]
    pub fn full() -> Self {
        Self {
            gen_svg: true,
            gen_gcode: true,
            ..Self::default()
        }
    }

    /// Place outputs under the given subdirectory
    #[must_use]
    pub fn in_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }
}

/// Result of one compile invocation
///
/// Transient; not persisted beyond one attempt's lifetime. Diagnostics are
/// kept in compiler output order, each classified as warning or error by a
/// keyword match.
#[derive(Debug, Clone, Default)]
pub struct CompileOutcome {
    /// Whether the compiler accepted the source
    pub success: bool,
    /// Error diagnostics, in output order
    pub errors: Vec<String>,
    /// Warning diagnostics, in output order
    pub warnings: Vec<String>,
    /// SVG preview path, when produced
    pub svg_path: Option<Utf8PathBuf>,
    /// G-code path, when produced
    pub gcode_path: Option<Utf8PathBuf>,
}

impl CompileOutcome {
    /// All diagnostics, errors first, for corrective prompts
    #[must_use]
    pub fn diagnostics(&self) -> Vec<String> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .cloned()
            .collect()
    }
}

/// Capability interface over the external compiler
///
/// Source text plus options in, success/diagnostics/artifact paths out. The
/// external compiler is a black box invoked once per call with no persisted
/// state between calls, so the pipeline's control flow and tests never
/// depend on an actual executable.
#[async_trait]
pub trait CompileGate: Send + Sync {
    /// Compile one source text under the given logical output name
    ///
    /// Implementations must observe `cancel` at the process-wait suspension
    /// point and return `CompilerError::Cancelled` without retrying.
    ///
    /// # Errors
    ///
    /// Returns `CompilerError` for infrastructure failures only; a rejected
    /// source is a successful call with `outcome.success == false`.
    async fn compile(
        &self,
        code: &str,
        output_name: &str,
        options: &CompileOptions,
        cancel: &CancellationToken,
    ) -> Result<CompileOutcome, CompilerError>;
}
