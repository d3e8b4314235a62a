use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use crate::db::{open_project_db, ProjectConfig, ProjectDb, ProjectLayout};
use crate::pipeline::{Pipeline, PintoolConfig, Sink};
use crate::truth::PrototypeDb;

/// Convenience wrapper bundling layout, config, db path, and an open ProjectDb.
#[derive(Debug)]
pub struct ProjectContext {
    pub layout: ProjectLayout,
    pub config: ProjectConfig,
    pub db_path: PathBuf,
    pub db: ProjectDb,
}

impl ProjectContext {
    /// Load project config and open the database for a given root.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let layout = ProjectLayout::new(root);
        let (config, db_path, db) = open_project_db(&layout)?;
        Ok(Self { layout, config, db_path, db })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.layout.resolve(&self.config.log_dir)
    }

    /// Pintool configurations for every configured pass, paths resolved.
    pub fn pintool_configs(&self) -> Vec<PintoolConfig> {
        self.config
            .passes
            .iter()
            .map(|p| {
                PintoolConfig::from_pass_config(
                    p,
                    &self.config.engine,
                    &self.config.log_dir,
                    &self.layout.root,
                )
            })
            .collect()
    }

    /// Register the configured passes in order.
    pub fn pipeline(&self) -> Result<Pipeline> {
        Pipeline::new(self.pintool_configs()).context("Failed to configure pass pipeline")
    }

    /// Same as `pipeline`, with every pass reporting through the given sinks.
    pub fn pipeline_with_sinks(&self, stdout: Sink, stderr: Sink) -> Result<Pipeline> {
        let configs = self
            .pintool_configs()
            .into_iter()
            .map(|c| c.with_sinks(Arc::clone(&stdout), Arc::clone(&stderr)))
            .collect();
        Pipeline::new(configs).context("Failed to configure pass pipeline")
    }

    /// Load the configured ground-truth prototypes.
    pub fn ground_truth(&self) -> Result<PrototypeDb> {
        let path = self
            .config
            .prototypes
            .as_ref()
            .ok_or_else(|| anyhow!("No prototype database configured (set \"prototypes\")"))?;
        Ok(PrototypeDb::load(&self.layout.resolve(path))?)
    }
}
