//! Structured response extraction for sketch-studio
//!
//! Pure text-in, structured-optional-fields-out parsing of LLM responses.
//! Extraction tries structural markers in a fixed priority order (explicit
//! tag, then fenced code block, then inline-comment fallback for
//! sub-artifact contexts) and signals malformed-structure failure when
//! mandatory fields are absent. No network or process dependency.

mod artifact;
mod patterns;
mod plan;

pub use artifact::{ParsedArtifact, parse_artifact};
pub use patterns::{extract_code, extract_comment_tag, extract_sketch_code, extract_tag};
pub use plan::{SectionPlan, SketchPlan, parse_fragment, parse_plan};

use thiserror::Error;

/// Malformed-structure failures
///
/// Each variant names the missing required marker so corrective re-prompts
/// can reference the exact element the model omitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// No code block could be found under any marker
    #[error("no <code> block found in response")]
    MissingCode,

    /// No title under the tag or comment-tag fallback
    #[error("no <title> found in response")]
    MissingTitle,

    /// No plan envelope in a planning response
    #[error("no <plan> section found in response")]
    MissingPlan,
}
