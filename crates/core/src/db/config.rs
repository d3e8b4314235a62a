use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pipeline::{EngineConfig, PassConfig};

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Path to the project database file (typically relative to project root).
    pub path: String,
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

/// Serializable configuration describing a protoscope project.
///
/// This lives at `.protoscope/project.json` in the project root. Relative
/// paths are resolved against the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Human-friendly project name.
    pub name: String,
    /// Optional description / notes.
    pub description: Option<String>,
    /// Schema/config version. This is about the config format.
    pub config_version: String,
    /// Database configuration (path is typically relative to project root).
    pub db: DbConfig,
    /// Directory shared by every pass for its artifacts.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Instrumentation engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Passes in registration order.
    #[serde(default)]
    pub passes: Vec<PassConfig>,
    /// Ground-truth prototype database (JSON or YAML).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototypes: Option<PathBuf>,
}

impl ProjectConfig {
    /// Create a configuration with the default arity > type > couple chain.
    pub fn new(name: impl Into<String>, db_path: impl Into<String>) -> Self {
        let pass = |name: &str, prev: Option<&str>| PassConfig {
            name: name.to_string(),
            src_path: PathBuf::from(format!("pintool/{name}.cpp")),
            obj_path: PathBuf::from(format!("pintool/obj/{name}.so")),
            prev_step: prev.map(str::to_string),
        };
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            db: DbConfig::new(db_path),
            log_dir: default_log_dir(),
            engine: EngineConfig::default(),
            passes: vec![
                pass("arity", None),
                pass("type", Some("arity")),
                pass("couple", Some("type")),
            ],
            prototypes: None,
        }
    }
}
