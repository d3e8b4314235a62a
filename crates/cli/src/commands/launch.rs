use anyhow::{bail, Context, Result};
use protoscope_core::db::LaunchRecord;
use protoscope_core::pipeline::{BuildOptions, LaunchOptions};

use crate::commands::{build_and_record, console_pipeline, now_timestamp, open_context, parse_pass};
use crate::{absolute_binary_path, sha256_file};

/// Switches for `launch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchFlags {
    /// Skip the build step and use whatever module is at `obj_path`.
    pub no_build: bool,
    pub quiet: bool,
    /// Keep the instrumented process's output in a `.log` artifact.
    pub transcript: bool,
}

/// Build (unless skipped) and run one pass against `binary`, then record the run.
pub fn launch_command(
    root: &str,
    pass: &str,
    binary: &str,
    args: &[String],
    flags: LaunchFlags,
) -> Result<()> {
    let kind = parse_pass(pass)?;
    let ctx = open_context(root)?;
    let pipeline = console_pipeline(&ctx)?;
    let tool = pipeline.pintool(kind)?;

    if !flags.no_build {
        let outcome = build_and_record(&ctx.db, tool, BuildOptions::default())?;
        if !outcome.succeeded() {
            bail!("Build of the {} pintool failed; not launching", kind);
        }
    }

    let binary_path = absolute_binary_path(binary)?;
    let started_at = now_timestamp();
    let outcome = tool.launch(
        &binary_path,
        args,
        LaunchOptions { verbose: !flags.quiet, transcript: flags.transcript },
    )?;

    let binary_hash = sha256_file(&binary_path)?;
    ctx.db
        .insert_launch(&LaunchRecord {
            pass: kind.to_string(),
            binary: binary_path.display().to_string(),
            binary_hash: Some(binary_hash),
            results_path: outcome.results.path.display().to_string(),
            debug_path: outcome.debug.path.display().to_string(),
            input_path: outcome.input.as_ref().map(|p| p.display().to_string()),
            exit_code: outcome.exit_code,
            duration_ms: i64::try_from(outcome.duration.as_millis()).unwrap_or(i64::MAX),
            started_at,
        })
        .context("Failed to record launch")?;

    match outcome.exit_code {
        Some(0) => {}
        Some(code) => log::warn!("{} exited with status {code}", binary_path.display()),
        None => log::warn!("{} was terminated by a signal", binary_path.display()),
    }

    Ok(())
}
