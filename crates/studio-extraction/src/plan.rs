//! Sketch plan model and extraction

use std::collections::HashMap;

use regex::Regex;

use crate::ExtractionError;
use crate::artifact::parse_metadata;
use crate::patterns::{extract_sketch_code, extract_tag};

/// One independently workable portion of a sketch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPlan {
    /// Section title, unique within a plan
    pub title: String,
    /// What this section contains
    pub description: String,
    /// Titles of adjacent sections, order-preserving. Referenced titles
    /// need not exist in the plan; they are validated only informationally.
    pub neighbors: Vec<String>,
}

/// The initial plan for a decomposed sketch run
///
/// Produced once at the start of a run; immutable thereafter. The growing
/// combined code is tracked separately by the section coordinator, never by
/// mutating the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SketchPlan {
    /// Sketch title
    pub title: String,
    /// Detailed description of what the sketch depicts
    pub summary: String,
    /// Main subject matter
    pub subject: String,
    /// Viewing angle
    pub perspective: String,
    /// Artistic style
    pub style: String,
    /// Free-form metadata left to the model (lighting, mood, ...)
    pub metadata: HashMap<String, String>,
    /// Ordered sections of the sketch
    pub sections: Vec<SectionPlan>,
    /// Initial contour code outlining the major shapes
    pub contour_code: String,
}

/// Parse a planning response into a `SketchPlan`
///
/// The `<plan>` envelope and its `<title>` are mandatory, as is contour
/// code somewhere in the response (`<contours>` tag, `<code>` tag, or a
/// fenced block). Sections and metadata are optional.
///
/// # Errors
///
/// Returns `ExtractionError::MissingPlan`, `MissingTitle`, or `MissingCode`
/// naming the absent required marker.
pub fn parse_plan(content: &str) -> Result<SketchPlan, ExtractionError> {
    let plan_block = extract_tag(content, "plan");
    if plan_block.is_empty() {
        return Err(ExtractionError::MissingPlan);
    }

    let title = extract_tag(&plan_block, "title");
    if title.is_empty() {
        return Err(ExtractionError::MissingTitle);
    }

    let contour_code = extract_sketch_code(content);
    if contour_code.is_empty() {
        return Err(ExtractionError::MissingCode);
    }

    let metadata_block = extract_tag(&plan_block, "metadata");

    Ok(SketchPlan {
        title,
        summary: extract_tag(&plan_block, "summary"),
        subject: extract_tag(&plan_block, "subject"),
        perspective: extract_tag(&plan_block, "perspective"),
        style: extract_tag(&plan_block, "style"),
        metadata: parse_metadata(&metadata_block),
        sections: parse_sections(&plan_block),
        contour_code,
    })
}

/// Parse a section-expansion response into its code fragment
///
/// Uses the full sketch-code fallback chain; the fragment is the whole
/// artifact of an expansion response.
///
/// # Errors
///
/// Returns `ExtractionError::MissingCode` when no code can be found.
pub fn parse_fragment(content: &str) -> Result<String, ExtractionError> {
    let code = extract_sketch_code(content);
    if code.is_empty() {
        return Err(ExtractionError::MissingCode);
    }
    Ok(code)
}

fn parse_sections(plan_block: &str) -> Vec<SectionPlan> {
    let sections_block = extract_tag(plan_block, "sections");
    if sections_block.is_empty() {
        return Vec::new();
    }

    let section_re = Regex::new(r"(?s)<section>(.*?)</section>").unwrap();
    section_re
        .captures_iter(&sections_block)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            let body = m.as_str();
            SectionPlan {
                title: extract_tag(body, "title"),
                description: extract_tag(body, "description"),
                neighbors: parse_neighbors(&extract_tag(body, "neighbors")),
            }
        })
        .filter(|section| !section.title.is_empty())
        .collect()
}

/// Neighbor lists are comma-separated and order-preserving; empties dropped
fn parse_neighbors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN_RESPONSE: &str = r"<plan>
<title>Old Oak in a Meadow</title>
<summary>A gnarled oak dominating a quiet meadow.</summary>
<subject>oak tree</subject>
<perspective>eye level</perspective>
<style>expressive</style>
<metadata>
lighting: late afternoon
mood: still
</metadata>
<sections>
<section>
<title>Canopy</title>
<description>The leafy crown and major boughs</description>
<neighbors>Trunk</neighbors>
</section>
<section>
<title>Trunk</title>
<description>Bark texture and root flare</description>
<neighbors>Canopy, Meadow</neighbors>
</section>
<section>
<title>Meadow</title>
<description>Grasses and distant treeline</description>
<neighbors>Trunk</neighbors>
</section>
</sections>
</plan>

<contours>
# canopy
let crown : vec = (100, 60)
trace stroke from (60, 90) to (140, 90) via [(100, 40)]
# trunk
trace stroke from (95, 90) to (90, 160)
</contours>";

    #[test]
    fn test_parse_full_plan() {
        let plan = parse_plan(PLAN_RESPONSE).unwrap();

        assert_eq!(plan.title, "Old Oak in a Meadow");
        assert_eq!(plan.subject, "oak tree");
        assert_eq!(plan.perspective, "eye level");
        assert_eq!(plan.style, "expressive");
        assert_eq!(plan.metadata["lighting"], "late afternoon");
        assert_eq!(plan.sections.len(), 3);
        assert!(plan.contour_code.contains("let crown"));
    }

    #[test]
    fn test_section_neighbors_order_preserving() {
        let plan = parse_plan(PLAN_RESPONSE).unwrap();
        let trunk = &plan.sections[1];

        assert_eq!(trunk.title, "Trunk");
        assert_eq!(trunk.neighbors, vec!["Canopy", "Meadow"]);
    }

    #[test]
    fn test_parse_plan_missing_envelope() {
        let content = "<title>No Envelope</title>\n<code>\ntrace dot at origin\n</code>";
        assert_eq!(parse_plan(content), Err(ExtractionError::MissingPlan));
    }

    #[test]
    fn test_parse_plan_missing_title() {
        let content = "<plan>\n<summary>untitled</summary>\n</plan>\n<contours>\ncode\n</contours>";
        assert_eq!(parse_plan(content), Err(ExtractionError::MissingTitle));
    }

    #[test]
    fn test_parse_plan_missing_contours() {
        let content = "<plan>\n<title>No Code</title>\n</plan>";
        assert_eq!(parse_plan(content), Err(ExtractionError::MissingCode));
    }

    #[test]
    fn test_plan_without_sections_is_valid() {
        let content =
            "<plan>\n<title>Flat</title>\n</plan>\n<contours>\ntrace dot at origin\n</contours>";
        let plan = parse_plan(content).unwrap();
        assert!(plan.sections.is_empty());
    }

    #[test]
    fn test_parse_neighbors_drops_empties() {
        assert_eq!(parse_neighbors("A, , B,"), vec!["A", "B"]);
        assert!(parse_neighbors("").is_empty());
    }

    #[test]
    fn test_parse_fragment_tag_and_fence() {
        let tagged = "<code>\nlet canopy_1 : vec = (10, 20)\n</code>";
        assert_eq!(
            parse_fragment(tagged).unwrap(),
            "let canopy_1 : vec = (10, 20)"
        );

        let fenced = "```sketchlang\nscribble dash at (4, 4)\n```";
        assert_eq!(parse_fragment(fenced).unwrap(), "scribble dash at (4, 4)");

        assert_eq!(
            parse_fragment("prose without code"),
            Err(ExtractionError::MissingCode)
        );
    }
}
