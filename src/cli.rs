//! Command-line interface for sketch-studio

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use studio_compiler::SketchCompiler;
use studio_config::StudioConfig;
use studio_engine::{EngineError, SketchRequest, Studio};

use crate::lang::DEFAULT_LANG_SPEC;
use crate::logging::init_tracing;

/// Exit code for configuration and usage errors
const EXIT_CONFIG: i32 = 2;
/// Exit code for an interrupted run
const EXIT_INTERRUPTED: i32 = 130;
/// Exit code for any other terminal failure
const EXIT_FAILURE: i32 = 1;

/// sketch-studio - AI-powered sketch generation
#[derive(Parser)]
#[command(name = "sketch-studio")]
#[command(about = "Generate pen plotter sketches from natural-language descriptions")]
#[command(long_about = r"
sketch-studio turns a natural-language description into compiled SketchLang
artwork by planning a sketch with an LLM, expanding it section by section,
and validating every step through the sketchlang compiler.

EXAMPLES:
  # Generate from an inline description
  sketch-studio -d 'a cat sitting on a windowsill'

  # Generate from a description file, verbose output
  sketch-studio -f prompt.txt --output ./sketches -v

  # Single-shot mode: one validated generation, no section decomposition
  sketch-studio -d 'a single straight line' --single

ENVIRONMENT:
  ANTHROPIC_API_KEY - API key for the completion service (alternative to --key)

OUTPUT STRUCTURE:
  Each sketch is saved to its own subdirectory under the output directory:
    output/
      sketch_title/
        contours.sketch / contours.svg
        expanded_<section>.sketch / .svg
        final.sketch / final.svg
")]
#[command(version)]
pub struct Cli {
    /// Description of the sketch to generate
    #[arg(short = 'd', long)]
    pub description: Option<String>,

    /// File containing the sketch description
    #[arg(short = 'f', long = "file")]
    pub description_file: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the sketchlang compiler (defaults to PATH lookup)
    #[arg(long)]
    pub compiler: Option<Utf8PathBuf>,

    /// Output directory for generated files
    #[arg(long)]
    pub output: Option<Utf8PathBuf>,

    /// Anthropic API key (or set ANTHROPIC_API_KEY)
    #[arg(long = "key")]
    pub api_key: Option<String>,

    /// Model to use
    #[arg(long)]
    pub model: Option<String>,

    /// Path to a SketchLang specification file
    #[arg(long = "lang")]
    pub lang_file: Option<PathBuf>,

    /// Source handle the request came from (e.g., X username)
    #[arg(long = "from")]
    pub request_from: Option<String>,

    /// Generate in one validated request, without section decomposition
    #[arg(long)]
    pub single: bool,

    /// Verbose logging; persists raw responses and failed attempts
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI entrypoint: parse, run, map failures to exit codes
///
/// All output, including errors, happens here; `main` only maps the exit
/// code.
pub fn run() -> Result<(), i32> {
    let cli = Cli::parse();

    // A second init only happens under test harnesses; not fatal
    let _ = init_tracing(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            eprintln!("Error: failed to start runtime: {e}");
            EXIT_FAILURE
        })?;

    match runtime.block_on(generate(cli)) {
        Ok(title) => {
            println!("\nSketch '{title}' generated successfully!");
            Ok(())
        }
        Err(error) => {
            eprintln!("Error: {error:#}");
            Err(exit_code_for(&error))
        }
    }
}

async fn generate(cli: Cli) -> Result<String> {
    let description = resolve_description(&cli)?;
    let config = resolve_config(&cli)?;

    let lang_spec = match &cli.lang_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading language spec '{}'", path.display()))?,
        None => DEFAULT_LANG_SPEC.to_string(),
    };

    let gateway = studio_llm::backend_from_config(&config, cli.api_key.clone())?;
    let compiler = SketchCompiler::new(config.compiler.path.as_deref(), &config.output.dir)?;

    let studio = Studio::new(config, lang_spec, gateway, Box::new(compiler));

    // Ctrl-C cancels the run at the next suspension point
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, shutting down...");
            signal_token.cancel();
        }
    });

    let mut request = SketchRequest::new(description);
    if let Some(from) = cli.request_from {
        request = request.with_requested_by(from);
    }

    let sketch = if cli.single {
        studio.generate_single(&request, cancel).await?
    } else {
        studio.generate(&request, cancel).await?
    };

    Ok(sketch.summary.title)
}

fn resolve_description(cli: &Cli) -> Result<String> {
    if let Some(description) = &cli.description
        && !description.trim().is_empty()
    {
        return Ok(description.clone());
    }

    if let Some(path) = &cli.description_file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading description file '{}'", path.display()))?;
        if content.trim().is_empty() {
            bail!("description file '{}' is empty", path.display());
        }
        return Ok(content);
    }

    bail!("description required (-d or -f)");
}

fn resolve_config(cli: &Cli) -> Result<StudioConfig> {
    let mut config = match &cli.config {
        Some(path) => StudioConfig::load(path)?,
        None => StudioConfig::default(),
    };

    // CLI flags override the config file
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(compiler) = &cli.compiler {
        config.compiler.path = Some(compiler.clone());
    }
    if let Some(output) = &cli.output {
        config.output.dir = output.clone();
    }
    config.verbose |= cli.verbose;

    config.validate()?;
    Ok(config)
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    if let Some(engine_error) = error.downcast_ref::<EngineError>() {
        if engine_error.is_cancellation() {
            return EXIT_INTERRUPTED;
        }
        return EXIT_FAILURE;
    }
    if error.downcast_ref::<studio_config::ConfigError>().is_some() {
        return EXIT_CONFIG;
    }
    if error
        .downcast_ref::<studio_llm::LlmError>()
        .is_some_and(|e| matches!(e, studio_llm::LlmError::Misconfiguration(_)))
    {
        return EXIT_CONFIG;
    }
    if error.to_string().contains("description required") {
        return EXIT_CONFIG;
    }
    EXIT_FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_description_required() {
        let cli = Cli::parse_from(["sketch-studio"]);
        assert!(resolve_description(&cli).is_err());
    }

    #[test]
    fn test_inline_description_wins() {
        let cli = Cli::parse_from(["sketch-studio", "-d", "a lone pine"]);
        assert_eq!(resolve_description(&cli).unwrap(), "a lone pine");
    }

    #[test]
    fn test_flag_overrides_apply() {
        let cli = Cli::parse_from([
            "sketch-studio",
            "-d",
            "x",
            "--model",
            "claude-sonnet-4-5",
            "--output",
            "/tmp/sketches",
        ]);

        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.llm.model, "claude-sonnet-4-5");
        assert_eq!(config.output.dir.as_str(), "/tmp/sketches");
    }

    #[test]
    fn test_cancellation_exit_code() {
        let error = anyhow::Error::new(EngineError::Cancelled);
        assert_eq!(exit_code_for(&error), EXIT_INTERRUPTED);
    }

    #[test]
    fn test_config_error_exit_code() {
        let error = anyhow::Error::new(studio_config::ConfigError::Invalid(
            "llm.model must not be empty".to_string(),
        ));
        assert_eq!(exit_code_for(&error), EXIT_CONFIG);
    }
}
