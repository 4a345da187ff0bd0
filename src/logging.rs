//! Logging initialization for the sketch-studio CLI
//!
//! Structured logging via tracing, compact human-readable format. Verbose
//! mode widens the filter to debug-level events (token usage, compiler
//! argv, continuation activity).

use tracing_subscriber::{
    EnvFilter,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber
///
/// Respects `RUST_LOG` when set; otherwise verbose mode enables debug-level
/// events for the studio crates and info elsewhere.
///
/// # Errors
///
/// Returns an error if a subscriber was already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new(
                    "sketch_studio=debug,studio_engine=debug,studio_llm=debug,studio_compiler=debug,info",
                )
            } else {
                EnvFilter::try_new("info")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
