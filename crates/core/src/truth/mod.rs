//! Ground-truth prototypes consulted by the evaluators.
//!
//! The evaluators only depend on the `GroundTruth` trait. `PrototypeDb` is the
//! file-backed implementation used by the CLI: a JSON or YAML mapping from
//! function name to `[ret, param...]`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::Prototype;

/// Symbols injected by the toolchain or the C runtime rather than written in source.
const PSEUDO_FUNCTIONS: &[&str] = &[
    "_init",
    "_fini",
    "_start",
    "_dl_relocate_static_pie",
    "frame_dummy",
    "register_tm_clones",
    "deregister_tm_clones",
    "__do_global_dtors_aux",
    "__libc_csu_init",
    "__libc_csu_fini",
];

#[derive(Debug, Error)]
pub enum TruthError {
    #[error("Failed to read prototype database at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse prototype database at {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Source of declared signatures plus the two classifiers the evaluators need.
pub trait GroundTruth {
    fn prototype(&self, name: &str) -> Option<&Prototype>;

    /// True when the parameter list is open-ended.
    fn is_variadic(&self, proto: &Prototype) -> bool {
        proto.params().last().map(|p| p.trim() == "...").unwrap_or(false)
    }

    /// True for compiler- or runtime-injected symbols.
    fn is_pseudo_function(&self, name: &str) -> bool {
        PSEUDO_FUNCTIONS.contains(&name)
            || name.starts_with('.')
            || name.ends_with("@plt")
            || name.starts_with("__x86.")
    }
}

/// In-memory prototype table.
#[derive(Debug, Clone, Default)]
pub struct PrototypeDb {
    protos: HashMap<String, Prototype>,
}

impl PrototypeDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `.json`, `.yaml` or `.yml` (anything else is read as JSON).
    pub fn load(path: &Path) -> Result<Self, TruthError> {
        let body = std::fs::read_to_string(path)
            .map_err(|source| TruthError::Io { path: path.to_path_buf(), source })?;
        let is_yaml = matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"));
        let protos: HashMap<String, Prototype> = if is_yaml {
            serde_yaml::from_str(&body).map_err(|e| TruthError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&body).map_err(|e| TruthError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };
        log::debug!("loaded {} prototypes from {}", protos.len(), path.display());
        Ok(Self { protos })
    }

    pub fn insert(&mut self, name: impl Into<String>, proto: Prototype) -> &mut Self {
        self.protos.insert(name.into(), proto);
        self
    }

    pub fn len(&self) -> usize {
        self.protos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protos.is_empty()
    }
}

impl FromIterator<(String, Prototype)> for PrototypeDb {
    fn from_iter<T: IntoIterator<Item = (String, Prototype)>>(iter: T) -> Self {
        Self { protos: iter.into_iter().collect() }
    }
}

impl GroundTruth for PrototypeDb {
    fn prototype(&self, name: &str) -> Option<&Prototype> {
        self.protos.get(name)
    }
}
