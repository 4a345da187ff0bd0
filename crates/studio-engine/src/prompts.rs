//! Prompt construction for the generation pipeline
//!
//! All prompt text lives here so the orchestrator and coordinator stay pure
//! control flow. Corrective instructions are specific to the failure kind:
//! structural corrections name the missing markers, validation corrections
//! carry the compiler diagnostics verbatim.

use studio_extraction::{SectionPlan, SketchPlan};

/// Instruction appended when a truncated response needs continuing
pub const CONTINUE_INSTRUCTION: &str =
    "Continue exactly where you left off. Do not repeat any code.";

/// System prompt for the planning phase
#[must_use]
pub fn plan_system_prompt(lang_spec: &str) -> String {
    format!(
        r"You are an expert artist creating sketches using SketchLang, a domain-specific language for pen plotter artwork.

Here is the SketchLang specification:

{lang_spec}

When given a sketch request, you will:
1. Create a detailed plan with title, summary, subject, perspective, and style
2. Define logical sections of the sketch with titles, descriptions, and neighbor relationships
3. Write initial contour SketchLang code that outlines the major shapes

Format your response as follows:

<plan>
<title>Your Sketch Title</title>
<summary>A detailed description of what the sketch depicts</summary>
<subject>The main subject matter</subject>
<perspective>The viewing angle/perspective</perspective>
<style>The artistic style (minimalist, detailed, expressive, etc.)</style>
<metadata>
key1: value1
key2: value2
</metadata>
<sections>
<section>
<title>Section Name</title>
<description>What this section contains</description>
<neighbors>Neighbor1, Neighbor2</neighbors>
</section>
</sections>
</plan>

<contours>
# Your SketchLang code here
# Use comments to mark section boundaries
</contours>

Important notes:
- Coordinates are in mm, typical canvas is 200x200mm
- Use comments liberally to label sections
- Keep contours simple but well defined - details will be added later
- Think about how sections connect at boundaries

CRITICAL SketchLang constraints (violations will cause compilation errors):
- NO dot notation (vec.x, vec.y) - this does NOT exist
- NO variable reassignment - each variable can only be assigned once
- NO functions or loops - only let bindings and render commands
- NO duplicate strokes
- Variables must be declared with type: let name : type = value
- Valid types are: number, vec, sketch
- Vectors are created with parentheses: (x, y)
- Use unique variable names (e.g., prefix with section name)"
    )
}

/// User prompt for the planning phase
#[must_use]
pub fn plan_user_prompt(description: &str) -> String {
    format!(
        r"Create a sketch plan for the following request:

{description}

Remember to:
1. Provide a detailed summary and metadata
2. Break the sketch into logical sections
3. Create initial contour SketchLang code that outlines the main shapes
4. Use comments in your SketchLang code to label sections"
    )
}

/// System prompt for section expansion
#[must_use]
pub fn expand_system_prompt(lang_spec: &str) -> String {
    format!(
        r"You are a detail-focused artist adding depth to sketch sections using SketchLang.

Here is the SketchLang specification:

{lang_spec}

Your task is to expand a section with detailed strokes. You should:
1. Add detail strokes for textures and features
2. Use dashes for shading and tone
3. Maintain consistency with the overall style
4. Ensure strokes align with neighboring sections at boundaries

Provide your SketchLang code inside <code> tags:

<code>
# Your detailed SketchLang code
</code>

Important:
- Do NOT repeat the existing contour code - only write NEW code for this section
- Use trace for clean lines, draw for hand-drawn feel, scribble for sketchy areas
- Dashes orient based on nearby strokes (flow field)
- Use descriptive comments
- Prefix variable names with the section name to avoid conflicts (e.g., arm_base, arm_stroke1)

CRITICAL SketchLang constraints (violations will cause compilation errors):
- NO dot notation (vec.x, vec.y) - this does NOT exist
- NO variable reassignment - each variable can only be assigned once
- NO functions or loops - only let bindings and render commands
- Variables must be declared with type: let name : type = value
- Valid types are: number, vec, sketch"
    )
}

/// User prompt for expanding one section
///
/// Alignment context is always the *original* contour code, not the
/// accumulating artifact, so prompt size stays bounded regardless of how
/// many sections precede this one.
#[must_use]
pub fn expand_user_prompt(plan: &SketchPlan, section: &SectionPlan) -> String {
    let neighbor_context = if section.neighbors.is_empty() {
        String::new()
    } else {
        format!(
            "\nThis section connects to: {}. Ensure your strokes align at boundaries.",
            section.neighbors.join(", ")
        )
    };

    let variable_prefix = section.title.to_lowercase().replace(' ', "_");

    format!(
        r"Expand this section of the sketch with detailed SketchLang code.

SKETCH OVERVIEW:
Title: {title}
Summary: {summary}
Style: {style}
Perspective: {perspective}

SECTION TO EXPAND:
Title: {section_title}
Description: {section_description}{neighbor_context}

EXISTING CONTOUR CODE (for reference - do NOT repeat this, only add new code):
{contour_code}

Write NEW SketchLang code for this section only. Add strokes for details, shading with dashes, and fine details. Your code will be APPENDED to the existing code, so:
- Do NOT redeclare existing variables
- Use unique variable names (prefix with section name, e.g., {variable_prefix}_point1)
- Reference existing variables if needed for alignment",
        title = plan.title,
        summary = plan.summary,
        style = plan.style,
        perspective = plan.perspective,
        section_title = section.title,
        section_description = section.description,
        contour_code = plan.contour_code,
    )
}

/// System prompt for single-shot generation (no decomposition)
#[must_use]
pub fn single_system_prompt(lang_spec: &str) -> String {
    format!(
        r"You are an expert sketch artist using SketchLang.

{lang_spec}

Create a COMPLETE, EXTREMELY DETAILED sketch. Include all details, shading, and textures.

FORMAT:
<title>SKETCH TITLE</title>
<summary>Description of the sketch and subject placement.</summary>
<metadata>
<subject>Main subject</subject>
<perspective>View angle</perspective>
<style>Art style</style>
</metadata>
<code>
# Complete SketchLang code with ALL details
</code>

REQUIREMENTS:
- Complete sketch with full detail in one response
- Meaningful anchor point names throughout
- Vector math: let pos : vec = (center of shape) + (offset_x, offset_y)
- Use 'center of' for derived positions
- NO dot notation (vec.x is invalid)
- NO variable reassignment
- trace = precise lines, draw = organic, scribble = textured
- Use dashes for shading
- Types: number, vec, sketch"
    )
}

/// Corrective instruction for a failed compile or validation
///
/// Carries the diagnostics verbatim so the model can address root cause.
#[must_use]
pub fn validation_correction(diagnostics: &[String]) -> String {
    format!(
        "Compilation errors:\n{}\n\nPlease fix and provide corrected code.",
        diagnostics.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_plan() -> SketchPlan {
        SketchPlan {
            title: "Harbor".to_string(),
            summary: "Boats at rest".to_string(),
            subject: "harbor".to_string(),
            perspective: "aerial".to_string(),
            style: "minimalist".to_string(),
            metadata: HashMap::new(),
            sections: Vec::new(),
            contour_code: "trace dot at origin".to_string(),
        }
    }

    #[test]
    fn test_expand_prompt_includes_neighbor_context() {
        let section = SectionPlan {
            title: "Pier".to_string(),
            description: "Wooden pier".to_string(),
            neighbors: vec!["Boats".to_string(), "Water".to_string()],
        };

        let prompt = expand_user_prompt(&test_plan(), &section);

        assert!(prompt.contains("This section connects to: Boats, Water"));
        assert!(prompt.contains("pier_point1"));
        assert!(prompt.contains("trace dot at origin"));
    }

    #[test]
    fn test_expand_prompt_without_neighbors() {
        let section = SectionPlan {
            title: "Sky".to_string(),
            description: "Empty sky".to_string(),
            neighbors: Vec::new(),
        };

        let prompt = expand_user_prompt(&test_plan(), &section);
        assert!(!prompt.contains("This section connects to"));
    }

    #[test]
    fn test_validation_correction_carries_diagnostics_verbatim() {
        let diagnostics = vec![
            "line 3: unknown identifier 'mast'".to_string(),
            "line 7: type mismatch".to_string(),
        ];

        let instruction = validation_correction(&diagnostics);
        assert!(instruction.contains("line 3: unknown identifier 'mast'"));
        assert!(instruction.contains("line 7: type mismatch"));
    }

    #[test]
    fn test_system_prompts_embed_lang_spec() {
        let spec = "## unique-spec-marker";
        assert!(plan_system_prompt(spec).contains(spec));
        assert!(expand_system_prompt(spec).contains(spec));
        assert!(single_system_prompt(spec).contains(spec));
    }
}
