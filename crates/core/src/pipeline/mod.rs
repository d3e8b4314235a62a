//! Pass orchestration: registering the pass chain, building the
//! instrumentation modules, launching instrumented runs and locating the
//! artifacts each pass leaves behind.
//!
//! Everything here is synchronous. A launch blocks until the instrumented
//! process exits (there is no timeout), and ordering between passes is only
//! enforced by failing to find the predecessor's results.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::PassKind;
use crate::parser::ParseError;

pub mod artifacts;
pub mod build;
pub mod config;
pub mod pintool;
pub mod registry;

pub use artifacts::{artifact_path, matches_results, resolve_latest};
pub use build::{BuildOptions, BuildOutcome};
pub use config::{EngineConfig, PassConfig, PintoolConfig, Sink, DEFAULT_COMPILE_FLAGS_VAR};
pub use pintool::{LaunchOptions, LaunchOutcome, Pintool};
pub use registry::{PassRegistry, Pipeline};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required configuration value is missing or invalid.
    #[error("Invalid pass configuration: {0}")]
    Config(String),

    #[error("Pass '{0}' is not registered in this pipeline")]
    UnknownPass(PassKind),

    #[error("Binary not found at {0}")]
    MissingBinary(PathBuf),

    /// No results from `required` exist for `binary`.
    #[error(
        "Cannot find results from {required} inference for {binary} (needed by {pass}) - ensure that you did run every step in order (arity > type > couple) for this binary"
    )]
    MissingPredecessor { pass: PassKind, required: PassKind, binary: String },

    /// `pass` itself has not produced results for `binary` yet.
    #[error("No {pass} inference results for {binary} yet - launch the {pass} pass on it first")]
    NoResults { pass: PassKind, binary: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl PipelineError {
    pub(crate) fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        let context = context.into();
        move |source| PipelineError::Io { context, source }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
