//! sketch-studio CLI binary
//!
//! Minimal entrypoint; all logic lives in the library. `cli::run()` handles
//! all output including errors, main only maps to the process exit code.

fn main() {
    if let Err(code) = sketch_studio::cli::run() {
        std::process::exit(code);
    }
}
