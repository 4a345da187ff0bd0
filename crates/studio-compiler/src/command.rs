//! External compiler invocation

use std::process::Stdio;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::types::{CompileGate, CompileOptions, CompileOutcome, CompilerError};

/// Default compiler binary name, searched on PATH when no path is given
const DEFAULT_BINARY: &str = "sketchlang";

/// Wrapper around the external sketchlang compiler
///
/// Resolves the executable to an absolute path at construction and invokes
/// it once per compile with argv-style arguments (no shell evaluation).
/// Stateless with respect to the pipeline.
pub struct SketchCompiler {
    executable: Utf8PathBuf,
    output_dir: Utf8PathBuf,
}

impl SketchCompiler {
    /// Create a new compiler wrapper
    ///
    /// `executable` may be relative or absolute; when `None`, PATH is
    /// searched for `sketchlang`. The resolved binary must exist.
    ///
    /// # Errors
    ///
    /// Returns `CompilerError::NotFound` if the binary cannot be resolved.
    pub fn new(
        executable: Option<&Utf8Path>,
        output_dir: &Utf8Path,
    ) -> Result<Self, CompilerError> {
        let resolved = match executable {
            Some(path) => {
                let absolute = path
                    .canonicalize_utf8()
                    .map_err(|_| CompilerError::NotFound(path.to_string()))?;
                if !absolute.is_file() {
                    return Err(CompilerError::NotFound(path.to_string()));
                }
                absolute
            }
            None => {
                let found = which::which(DEFAULT_BINARY)
                    .map_err(|_| CompilerError::NotFound(DEFAULT_BINARY.to_string()))?;
                Utf8PathBuf::from_path_buf(found)
                    .map_err(|p| CompilerError::NotFound(p.display().to_string()))?
            }
        };

        Ok(Self {
            executable: resolved,
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Work directory for one invocation, created on demand
    fn work_dir(&self, options: &CompileOptions) -> Result<Utf8PathBuf, CompilerError> {
        let dir = match &options.subdir {
            Some(subdir) => self.output_dir.join(subdir),
            None => self.output_dir.clone(),
        };

        std::fs::create_dir_all(&dir).map_err(|source| CompilerError::WorkDir {
            path: dir.to_string(),
            source,
        })?;

        Ok(dir)
    }

    /// Build argv for one invocation
    ///
    /// The source file is referenced by bare name because the compiler runs
    /// with the work directory as its CWD. When neither format flag is set,
    /// both formats are produced.
    fn build_args(output_name: &str, options: &CompileOptions) -> Vec<String> {
        let mut args = vec![
            format!("{output_name}.sketch"),
            "-o".to_string(),
            output_name.to_string(),
        ];

        if let Some((x, y)) = options.position {
            args.push("-pos".to_string());
            args.push(format!("{x},{y}"));
        }

        if let Some((w, h)) = options.size {
            args.push("-size".to_string());
            args.push(format!("{w},{h}"));
        }

        if options.gen_gcode {
            args.push("--gcode".to_string());
        }
        if options.gen_svg {
            args.push("--svg".to_string());
        }
        if !options.gen_gcode && !options.gen_svg {
            args.push("--gcode".to_string());
            args.push("--svg".to_string());
        }

        args
    }
}

#[async_trait]
impl CompileGate for SketchCompiler {
    async fn compile(
        &self,
        code: &str,
        output_name: &str,
        options: &CompileOptions,
        cancel: &CancellationToken,
    ) -> Result<CompileOutcome, CompilerError> {
        let work_dir = self.work_dir(options)?;

        let source_path = work_dir.join(format!("{output_name}.sketch"));
        std::fs::write(&source_path, code).map_err(|source| CompilerError::WriteSource {
            path: source_path.to_string(),
            source,
        })?;

        let args = Self::build_args(output_name, options);
        debug!(
            compiler = %self.executable,
            work_dir = %work_dir,
            ?args,
            "Running sketchlang compiler"
        );

        let child = Command::new(self.executable.as_std_path())
            .args(&args)
            .current_dir(work_dir.as_std_path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::select! {
            result = child.wait_with_output() => result?,
            () = cancel.cancelled() => return Err(CompilerError::Cancelled),
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        let (errors, warnings) = classify_diagnostics(&stderr);

        let mut outcome = CompileOutcome {
            success: output.status.success(),
            errors,
            warnings,
            svg_path: None,
            gcode_path: None,
        };

        if !outcome.success && outcome.errors.is_empty() {
            // Compiler died without diagnostics; surface the exit status
            outcome
                .errors
                .push(format!("compiler exited with {}", output.status));
        }

        if outcome.success {
            let svg = work_dir.join(format!("{output_name}.svg"));
            if svg.is_file() {
                outcome.svg_path = Some(svg);
            }
            let gcode = work_dir.join(format!("{output_name}.gcode"));
            if gcode.is_file() {
                outcome.gcode_path = Some(gcode);
            }
        }

        Ok(outcome)
    }
}

/// Split compiler stderr into errors and warnings, preserving output order
///
/// A line containing "warning" (case-insensitive) is a warning; any other
/// non-empty line is an error.
fn classify_diagnostics(stderr: &str) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for line in stderr.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.to_lowercase().contains("warning") {
            warnings.push(line.to_string());
        } else {
            errors.push(line.to_string());
        }
    }

    (errors, warnings)
}
