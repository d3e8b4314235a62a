//! protoscope-core
//!
//! Drives dynamic-instrumentation passes that infer function signatures from
//! the runtime behavior of a program, and scores the inferred signatures
//! against ground-truth prototypes.
//!
//! The pipeline (`pipeline`) builds the instrumentation module for each pass,
//! launches the target under the engine and finds the artifact each pass
//! needs from its predecessor. The evaluators (`analysis`) parse a pass's
//! results (`parser`) and classify every record against a `truth::GroundTruth`.
//!
//! All substantive logic lives here so it can be tested thoroughly and reused
//! from multiple frontends.

pub mod analysis;
pub mod chart;
pub mod db;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod truth;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
