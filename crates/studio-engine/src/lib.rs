//! Generation pipeline core for sketch-studio
//!
//! Drives "ask the model for an artifact" operations through bounded,
//! message-history-aware retries: the turn orchestrator folds continuation
//! handling and validation feedback into a single retry state machine, the
//! section coordinator expands a planned sketch section by section against
//! the accumulated whole, and the studio sequences the phases end to end.

mod error;
mod interpret;
mod naming;
mod orchestrator;
pub mod prompts;
mod sections;
mod studio;
mod validate;

#[cfg(test)]
pub(crate) mod testing;

pub use error::EngineError;
pub use interpret::{ArtifactInterpreter, FragmentInterpreter, Interpreter, PlanInterpreter};
pub use naming::sanitize;
pub use orchestrator::{Turn, TurnOrchestrator};
pub use sections::{AccumulatedArtifact, SectionCoordinator, SectionOutcome};
pub use studio::{GeneratedSketch, SketchRequest, SketchSummary, Studio};
pub use validate::{CodeValidator, CompileValidator, Validation};
