use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Make variable carrying `EngineConfig::compile_flags` by default.
pub const DEFAULT_COMPILE_FLAGS_VAR: &str = "SCAT_COMPILE_FLAGS";

/// Instrumentation engine settings shared by every pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine launcher binary.
    pub bin: PathBuf,
    /// Engine root, handed to the build as `PIN_ROOT`.
    pub path: PathBuf,
    /// Extra options placed before `-t` on every launch (whitespace separated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_options: Option<String>,
    /// Handed to the build under `compile_flags_var`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_flags: Option<String>,
    /// Make variable the module Makefile reads its extra flags from;
    /// `SCAT_COMPILE_FLAGS` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_flags_var: Option<String>,
    /// Build tool; `make` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<PathBuf>,
}

/// Serializable description of one pass inside a project config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassConfig {
    pub name: String,
    pub src_path: PathBuf,
    pub obj_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_step: Option<String>,
}

/// Message sink for orchestrator output.
pub type Sink = Arc<dyn Fn(&str) + Send + Sync>;

/// Everything needed to construct a `Pintool`.
#[derive(Clone)]
pub struct PintoolConfig {
    /// Pass name (`arity`, `type` or `couple`).
    pub name: String,
    /// Instrumentation module source; its directory is the build directory.
    pub src_path: PathBuf,
    /// Where the compiled module is copied after a successful build.
    pub obj_path: PathBuf,
    pub engine: EngineConfig,
    /// Directory receiving every artifact of every pass.
    pub log_dir: PathBuf,
    /// Progress messages; the `log` facade at info level when unset.
    pub on_stdout: Option<Sink>,
    /// Error messages; the `log` facade at error level when unset.
    pub on_stderr: Option<Sink>,
    /// Pass whose results this pass reads.
    pub prev_step: Option<String>,
}

impl PintoolConfig {
    pub fn new(
        name: impl Into<String>,
        src_path: impl Into<PathBuf>,
        obj_path: impl Into<PathBuf>,
        engine: EngineConfig,
        log_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            src_path: src_path.into(),
            obj_path: obj_path.into(),
            engine,
            log_dir: log_dir.into(),
            on_stdout: None,
            on_stderr: None,
            prev_step: None,
        }
    }

    pub fn with_prev_step(mut self, prev: impl Into<String>) -> Self {
        self.prev_step = Some(prev.into());
        self
    }

    pub fn with_sinks(mut self, stdout: Sink, stderr: Sink) -> Self {
        self.on_stdout = Some(stdout);
        self.on_stderr = Some(stderr);
        self
    }

    /// Build from a project's pass entry, resolving relative paths against `root`.
    pub fn from_pass_config(
        pass: &PassConfig,
        engine: &EngineConfig,
        log_dir: &Path,
        root: &Path,
    ) -> Self {
        let abs = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { root.join(p) };
        Self {
            name: pass.name.clone(),
            src_path: abs(&pass.src_path),
            obj_path: abs(&pass.obj_path),
            engine: engine.clone(),
            log_dir: abs(log_dir),
            on_stdout: None,
            on_stderr: None,
            prev_step: pass.prev_step.clone(),
        }
    }
}

impl fmt::Debug for PintoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PintoolConfig")
            .field("name", &self.name)
            .field("src_path", &self.src_path)
            .field("obj_path", &self.obj_path)
            .field("engine", &self.engine)
            .field("log_dir", &self.log_dir)
            .field("prev_step", &self.prev_step)
            .finish_non_exhaustive()
    }
}
