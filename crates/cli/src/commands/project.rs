use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use protoscope_core::db::{ProjectConfig, ProjectDb, ProjectLayout};
use protoscope_core::pipeline::{EngineConfig, PassConfig, Pipeline};
use serde::Serialize;

use crate::commands::{open_context, print_path_status};
use crate::{canonicalize_or_current, infer_project_name};

#[derive(Serialize)]
pub struct ProjectInfoSnapshot {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub log_dir: String,
    pub engine: EngineConfig,
    pub passes: Vec<PassConfig>,
    pub prototypes: Option<String>,
    /// Run order with each pass's prerequisites; empty when the pipeline
    /// cannot be configured yet.
    pub pipeline: Vec<PassRequirements>,
    pub pipeline_error: Option<String>,
    pub launches: usize,
    pub builds: usize,
}

#[derive(Serialize)]
pub struct PassRequirements {
    pub pass: String,
    pub code: usize,
    pub requires: Vec<String>,
}

fn pass_requirements(pipeline: &Pipeline) -> Vec<PassRequirements> {
    let registry = pipeline.registry();
    registry
        .passes()
        .iter()
        .map(|p| PassRequirements {
            pass: p.kind.to_string(),
            code: p.code,
            requires: registry.requirements(p.kind).iter().map(ToString::to_string).collect(),
        })
        .collect()
}

/// Initialize a new project at `root`.
pub fn init_project_command(
    root: &str,
    name: Option<String>,
    engine_bin: Option<PathBuf>,
    engine_path: Option<PathBuf>,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let project_name = match name {
        Some(n) => n,
        None => infer_project_name(&root_path),
    };

    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    fs::create_dir_all(&layout.logs_dir)
        .with_context(|| format!("Failed to create logs dir: {}", layout.logs_dir.display()))?;

    let mut config = ProjectConfig::new(&project_name, layout.db_path_relative_string());
    if let Some(bin) = engine_bin {
        config.engine.bin = bin;
    }
    if let Some(path) = engine_path {
        config.engine.path = path;
    }

    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.project_config_path, json).with_context(|| {
        format!("Failed to write project config: {}", layout.project_config_path.display())
    })?;

    // Create the database up front so later commands can rely on it.
    ProjectDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize project database at {}", layout.db_path.display())
    })?;

    println!("Initialized protoscope project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.project_config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Logs dir: {}", layout.logs_dir.display());
    if config.engine.bin.as_os_str().is_empty() {
        println!("  Engine: (not configured, edit \"engine\" in the config)");
    }

    Ok(())
}

/// Show basic information about an existing project.
pub fn project_info_command(root: &str, json: bool) -> Result<()> {
    let ctx = open_context(root)?;
    let launches = ctx.db.list_launches(None).context("Failed to list launches")?;
    let builds = ctx.db.list_builds().context("Failed to list builds")?;
    let config = &ctx.config;
    let (pipeline, pipeline_error) = match ctx.pipeline() {
        Ok(p) => (pass_requirements(&p), None),
        Err(e) => (Vec::new(), Some(format!("{e:#}"))),
    };

    if json {
        let snapshot = ProjectInfoSnapshot {
            name: config.name.clone(),
            root: ctx.layout.root.display().to_string(),
            config_file: ctx.layout.project_config_path.display().to_string(),
            config_version: config.config_version.clone(),
            db_path: config.db.path.clone(),
            log_dir: ctx.log_dir().display().to_string(),
            engine: config.engine.clone(),
            passes: config.passes.clone(),
            prototypes: config.prototypes.as_ref().map(|p| p.display().to_string()),
            pipeline,
            pipeline_error,
            launches: launches.len(),
            builds: builds.len(),
        };
        let serialized = serde_json::to_string_pretty(&snapshot)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Protoscope Project Info");
    println!("=======================");
    println!("Name: {}", config.name);
    println!("Root: {}", ctx.layout.root.display());
    println!("Config file: {}", ctx.layout.project_config_path.display());
    println!("Config version: {}", config.config_version);
    println!("DB path (config): {}", config.db.path);
    println!("Engine: {}", config.engine.bin.display());
    println!();

    println!("Paths:");
    print_path_status("Meta dir (.protoscope)", &ctx.layout.meta_dir);
    print_path_status("Logs dir", &ctx.log_dir());
    if let Some(protos) = &config.prototypes {
        print_path_status("Prototypes", &ctx.layout.resolve(protos));
    }
    println!();

    println!("Passes:");
    for pass in &config.passes {
        let prev = pass.prev_step.as_deref().unwrap_or("(entry)");
        println!("- {} (after: {}, module: {})", pass.name, prev, pass.obj_path.display());
    }
    println!();

    println!("Pipeline:");
    match pipeline_error {
        Some(err) => println!("- not ready: {err}"),
        None => {
            for req in &pipeline {
                let requires =
                    if req.requires.is_empty() { "nothing".to_string() } else { req.requires.join(" > ") };
                println!("- [{}] {} requires {}", req.code, req.pass, requires);
            }
        }
    }
    println!();
    println!("Launches: {}", launches.len());
    println!("Builds: {}", builds.len());

    Ok(())
}
