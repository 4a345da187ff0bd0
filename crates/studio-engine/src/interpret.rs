//! Response interpretation strategies for the orchestrator
//!
//! The turn orchestrator is abstract over what it extracts from a response:
//! a full artifact, a sketch plan, or a bare section fragment. Each
//! interpreter supplies its own corrective instruction so a re-prompt names
//! exactly the markers the model omitted.

use studio_extraction::{
    ExtractionError, ParsedArtifact, SketchPlan, parse_artifact, parse_fragment, parse_plan,
};

/// Interpretation strategy for one orchestrator invocation
pub trait Interpreter: Send + Sync {
    /// Parsed output type
    type Output;

    /// Extract structured output from raw response text
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError` naming the missing required marker.
    fn interpret(&self, content: &str) -> Result<Self::Output, ExtractionError>;

    /// The code of a successful output, for validation
    fn code_of<'a>(&self, output: &'a Self::Output) -> &'a str;

    /// Corrective instruction for a malformed response
    fn corrective_instruction(&self, error: &ExtractionError) -> String;
}

/// Interprets complete-sketch responses
pub struct ArtifactInterpreter;

impl Interpreter for ArtifactInterpreter {
    type Output = ParsedArtifact;

    fn interpret(&self, content: &str) -> Result<Self::Output, ExtractionError> {
        parse_artifact(content)
    }

    fn code_of<'a>(&self, output: &'a Self::Output) -> &'a str {
        &output.code
    }

    fn corrective_instruction(&self, error: &ExtractionError) -> String {
        format!(
            "Parse error: {error}\n\nPlease fix and include <title>, <summary>, <metadata>, and <code> tags."
        )
    }
}

/// Interprets planning responses
pub struct PlanInterpreter;

impl Interpreter for PlanInterpreter {
    type Output = SketchPlan;

    fn interpret(&self, content: &str) -> Result<Self::Output, ExtractionError> {
        parse_plan(content)
    }

    fn code_of<'a>(&self, output: &'a Self::Output) -> &'a str {
        &output.contour_code
    }

    fn corrective_instruction(&self, error: &ExtractionError) -> String {
        format!(
            "Parse error: {error}\n\nPlease resend the complete plan inside <plan> tags (containing <title>, <summary>, <subject>, <perspective>, <style>, <metadata>, and <sections>) followed by the contour code inside <contours> tags."
        )
    }
}

/// Interprets section-expansion responses (code only)
pub struct FragmentInterpreter;

impl Interpreter for FragmentInterpreter {
    type Output = String;

    fn interpret(&self, content: &str) -> Result<Self::Output, ExtractionError> {
        parse_fragment(content)
    }

    fn code_of<'a>(&self, output: &'a Self::Output) -> &'a str {
        output
    }

    fn corrective_instruction(&self, error: &ExtractionError) -> String {
        format!("Parse error: {error}\n\nProvide your SketchLang code inside <code> tags.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_correction_names_required_tags() {
        let instruction =
            ArtifactInterpreter.corrective_instruction(&ExtractionError::MissingTitle);

        assert!(instruction.contains("<title>"));
        assert!(instruction.contains("<code>"));
        assert!(instruction.contains("no <title> found"));
    }

    #[test]
    fn test_plan_correction_names_envelope() {
        let instruction = PlanInterpreter.corrective_instruction(&ExtractionError::MissingPlan);

        assert!(instruction.contains("<plan>"));
        assert!(instruction.contains("<contours>"));
    }

    #[test]
    fn test_fragment_interpreter_round_trip() {
        let output = FragmentInterpreter
            .interpret("<code>\ntrace dot at origin\n</code>")
            .unwrap();

        assert_eq!(FragmentInterpreter.code_of(&output), "trace dot at origin");
    }
}
