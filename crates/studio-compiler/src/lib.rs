//! External sketchlang compiler invocation for sketch-studio
//!
//! The compile gate: given sketch source, invoke the external compiler
//! collaborator once and yield success/failure plus an ordered list of
//! classified diagnostics and the paths of any produced artifacts. The
//! `CompileGate` trait keeps the pipeline's control flow independent of the
//! actual executable; test doubles simulate success, syntax errors, and
//! crashes.

mod command;
mod types;

pub use command::SketchCompiler;
pub use types::{CompileGate, CompileOptions, CompileOutcome, CompilerError};
