//! Parsed artifact model and extraction

use std::collections::HashMap;

use crate::ExtractionError;
use crate::patterns::{extract_code, extract_comment_tag, extract_tag};

/// Metadata keys with dedicated sub-tags in the response format
const RECOGNIZED_METADATA_KEYS: [&str; 3] = ["subject", "perspective", "style"];

/// A structurally valid generation result
///
/// Invariant: `title` and `code` are non-empty. An artifact violating this
/// never escapes `parse_artifact` as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArtifact {
    /// Sketch title
    pub title: String,
    /// Description of the sketch (may be empty)
    pub summary: String,
    /// Recognized and free-form metadata; keys unique
    pub metadata: HashMap<String, String>,
    /// The sketch source code
    pub code: String,
}

/// Parse a complete-sketch response into a `ParsedArtifact`
///
/// The code block is mandatory (`<code>` tag, fenced-block fallback), as is
/// the title (`<title>` tag, comment-tag fallback inside the code). Summary
/// and metadata are optional.
///
/// # Errors
///
/// Returns `ExtractionError::MissingCode` or `ExtractionError::MissingTitle`
/// naming the absent required marker.
pub fn parse_artifact(content: &str) -> Result<ParsedArtifact, ExtractionError> {
    let code = extract_code(content);
    if code.is_empty() {
        return Err(ExtractionError::MissingCode);
    }

    let mut title = extract_tag(content, "title");
    if title.is_empty() {
        title = extract_comment_tag(&code, "title");
    }
    if title.is_empty() {
        return Err(ExtractionError::MissingTitle);
    }

    let mut summary = extract_tag(content, "summary");
    if summary.is_empty() {
        summary = extract_comment_tag(&code, "summary");
    }

    let metadata_block = extract_tag(content, "metadata");
    let metadata = parse_metadata(&metadata_block);

    Ok(ParsedArtifact {
        title,
        summary,
        metadata,
        code,
    })
}

/// Parse a metadata block: recognized sub-tags first, then free-form
/// `key: value` lines. Keys stay unique; sub-tag values win.
pub(crate) fn parse_metadata(block: &str) -> HashMap<String, String> {
    let mut metadata = HashMap::new();

    for key in RECOGNIZED_METADATA_KEYS {
        let value = extract_tag(block, key);
        if !value.is_empty() {
            metadata.insert(key.to_string(), value);
        }
    }

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('<') {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            let value = value.trim();
            if !key.is_empty() && !value.is_empty() {
                metadata
                    .entry(key.to_string())
                    .or_insert_with(|| value.to_string());
            }
        }
    }

    metadata
}
