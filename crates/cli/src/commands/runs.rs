use anyhow::{Context, Result};
use protoscope_core::db::{BuildRecord, LaunchRecord};
use serde::Serialize;

use crate::commands::{open_context, parse_pass};

#[derive(Serialize)]
pub struct RunsSnapshot {
    pub launches: Vec<LaunchRecord>,
    pub builds: Vec<BuildRecord>,
}

/// List recorded launches (optionally for one pass) and builds.
pub fn runs_command(root: &str, pass: Option<&str>, json: bool) -> Result<()> {
    let pass = pass.map(parse_pass).transpose()?;
    let ctx = open_context(root)?;
    let pass_name = pass.map(|p| p.to_string());
    let launches = ctx.db.list_launches(pass_name.as_deref()).context("Failed to list launches")?;
    let builds: Vec<BuildRecord> = ctx
        .db
        .list_builds()
        .context("Failed to list builds")?
        .into_iter()
        .filter(|b| pass_name.as_deref().map_or(true, |p| b.pass == p))
        .collect();

    if json {
        let serialized = serde_json::to_string_pretty(&RunsSnapshot { launches, builds })?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Launches:");
    if launches.is_empty() {
        println!("(none)");
    }
    for run in &launches {
        let exit = run.exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
        println!(
            "- [{}] {} {} -> {} (exit: {}, {} ms)",
            run.started_at, run.pass, run.binary, run.results_path, exit, run.duration_ms
        );
    }

    println!("Builds:");
    if builds.is_empty() {
        println!("(none)");
    }
    for build in &builds {
        println!("- [{}] {} {}: {}", build.finished_at, build.pass, build.variant, build.outcome);
    }

    Ok(())
}
