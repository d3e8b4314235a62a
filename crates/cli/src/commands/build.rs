use anyhow::{bail, Context, Result};
use protoscope_core::pipeline::BuildOptions;

use crate::commands::{build_and_record, console_pipeline, open_context, parse_pass, record_build};

/// Build every configured pass, or only `passes` when given.
///
/// All selected passes are attempted; the command fails afterwards if any
/// build did.
pub fn build_command(root: &str, passes: &[String], options: BuildOptions) -> Result<()> {
    let ctx = open_context(root)?;
    let pipeline = console_pipeline(&ctx)?;

    let mut failed = Vec::new();
    if passes.is_empty() {
        let outcomes = pipeline.build_all(options).context("Failed to build pintools")?;
        for (kind, outcome) in outcomes {
            record_build(&ctx.db, pipeline.pintool(kind)?, options, outcome)?;
            if !outcome.succeeded() {
                failed.push(kind.to_string());
            }
        }
    } else {
        let selected = passes
            .iter()
            .map(|p| Ok(pipeline.pintool(parse_pass(p)?)?))
            .collect::<Result<Vec<_>>>()?;
        for tool in selected {
            let outcome = build_and_record(&ctx.db, tool, options)?;
            if !outcome.succeeded() {
                failed.push(tool.pass().kind.to_string());
            }
        }
    }

    if !failed.is_empty() {
        bail!("Build failed for: {}", failed.join(", "));
    }
    Ok(())
}
