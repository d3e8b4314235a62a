use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{SecondsFormat, Utc};
use protoscope_core::db::{BuildRecord, ProjectContext, ProjectDb};
use protoscope_core::model::PassKind;
use protoscope_core::pipeline::{BuildOptions, BuildOutcome, Pintool, Pipeline};

use crate::canonicalize_or_current;

/// Load the project rooted at `root` (config + open DB).
pub fn open_context(root: &str) -> Result<ProjectContext> {
    let root_path = canonicalize_or_current(root)?;
    ProjectContext::from_root(&root_path)
}

/// The configured pipeline, with pass messages written to the console.
pub fn console_pipeline(ctx: &ProjectContext) -> Result<Pipeline> {
    ctx.pipeline_with_sinks(Arc::new(|msg: &str| println!("{msg}")), Arc::new(|msg: &str| eprintln!("{msg}")))
}

pub fn parse_pass(name: &str) -> Result<PassKind> {
    name.parse::<PassKind>().map_err(|e| anyhow!(e))
}

/// Current time as an RFC 3339 string, as stored in the project DB.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Build `tool` and record the outcome in the project DB.
pub fn build_and_record(db: &ProjectDb, tool: &Pintool, options: BuildOptions) -> Result<BuildOutcome> {
    let outcome = tool
        .ensure_built(options)
        .with_context(|| format!("Failed to build {} pintool", tool.pass().kind))?;
    record_build(db, tool, options, outcome)?;
    Ok(outcome)
}

/// Store one build outcome in the project DB.
pub fn record_build(
    db: &ProjectDb,
    tool: &Pintool,
    options: BuildOptions,
    outcome: BuildOutcome,
) -> Result<()> {
    db.insert_build(&BuildRecord {
        pass: tool.pass().kind.to_string(),
        variant: tool.variant_name(options),
        outcome: outcome.as_str().to_string(),
        finished_at: now_timestamp(),
    })
    .context("Failed to record build")?;
    Ok(())
}

/// Helper to print whether a path exists.
pub fn print_path_status(label: &str, path: &Path) {
    let exists = path.exists();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}
