//! sketch-studio - LLM-driven pen plotter sketch generation
//!
//! Turns a natural-language description into compiled SketchLang artwork:
//! an LLM plans the sketch, expands it section by section, and every step
//! is validated through the external sketchlang compiler, with bounded
//! corrective retries for malformed, truncated, or rejected responses.
//!
//! The pipeline is assembled from focused crates:
//!
//! - [`studio_llm`]: the completion gateway (Anthropic Messages API)
//! - [`studio_extraction`]: structured extraction of plans, artifacts, and
//!   section fragments from raw responses
//! - [`studio_compiler`]: the compile gate over the external compiler
//! - [`studio_engine`]: the turn orchestrator, section coordinator, and
//!   studio phase sequencing
//! - [`studio_config`]: configuration model and budgets
//!
//! # Quick start
//!
//! ```bash
//! export ANTHROPIC_API_KEY=...
//! sketch-studio -d "a cat sitting on a windowsill"
//! ```
//!
//! # Library use
//!
//! ```no_run
//! use sketch_studio::lang::DEFAULT_LANG_SPEC;
//! use studio_config::StudioConfig;
//! use studio_engine::{SketchRequest, Studio};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = StudioConfig::default();
//! let gateway = studio_llm::backend_from_config(&config, None)?;
//! let compiler = studio_compiler::SketchCompiler::new(None, &config.output.dir)?;
//!
//! let studio = Studio::new(config, DEFAULT_LANG_SPEC, gateway, Box::new(compiler));
//! let sketch = studio
//!     .generate(&SketchRequest::new("a lighthouse"), CancellationToken::new())
//!     .await?;
//! println!("generated '{}'", sketch.summary.title);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod lang;
pub mod logging;

pub use studio_engine::{GeneratedSketch, SketchRequest, SketchSummary, Studio};
