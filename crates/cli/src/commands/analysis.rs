use anyhow::Result;
use protoscope_core::analysis::{AccuracyReport, Analysis, Evaluate, GeneralInfo, MismatchReport};
use protoscope_core::db::ProjectContext;
use serde::Serialize;

use crate::absolute_binary_path;
use crate::commands::{console_pipeline, open_context, parse_pass};

#[derive(Serialize)]
pub struct AccuracySnapshot {
    pub info: GeneralInfo,
    pub accuracy: AccuracyReport,
}

#[derive(Serialize)]
pub struct MismatchSnapshot {
    pub info: GeneralInfo,
    pub mismatches: Vec<MismatchReport>,
}

/// Parse the latest results of `pass` for `binary`.
fn latest_analysis(ctx: &ProjectContext, pass: &str, binary: &str) -> Result<Analysis> {
    let kind = parse_pass(pass)?;
    let pipeline = console_pipeline(ctx)?;
    Ok(pipeline.pintool(kind)?.analysis(&absolute_binary_path(binary)?)?)
}

/// Score the latest results of `pass` for `binary` against the prototype database.
pub fn accuracy_command(root: &str, pass: &str, binary: &str, json: bool) -> Result<()> {
    let ctx = open_context(root)?;
    let analysis = latest_analysis(&ctx, pass, binary)?;
    let truth = ctx.ground_truth()?;
    let accuracy = analysis.accuracy(&truth);

    if json {
        let snapshot = AccuracySnapshot { info: analysis.info(), accuracy };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{}", analysis.info());
    print!("{}", accuracy);
    Ok(())
}

/// List every function whose inference disagrees with its prototype.
pub fn mismatch_command(root: &str, pass: &str, binary: &str, json: bool) -> Result<()> {
    let ctx = open_context(root)?;
    let analysis = latest_analysis(&ctx, pass, binary)?;
    let truth = ctx.ground_truth()?;
    let mismatches = analysis.mismatches(&truth);

    if json {
        let snapshot = MismatchSnapshot { info: analysis.info(), mismatches };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{}", analysis.info());
    if mismatches.is_empty() {
        println!("(no mismatches)");
        return Ok(());
    }
    for report in &mismatches {
        print!("{}", report);
    }
    println!();
    println!("{} mismatching functions", mismatches.len());
    Ok(())
}

/// Print the parsed results, one line per record.
pub fn display_command(root: &str, pass: &str, binary: &str) -> Result<()> {
    let ctx = open_context(root)?;
    let analysis = latest_analysis(&ctx, pass, binary)?;
    println!("{}", analysis.info());
    for line in analysis.display_lines() {
        println!("{}", line);
    }
    Ok(())
}
