use std::path::Path;

use anyhow::{anyhow, Result};
use protoscope_core::chart::{parse_chart_file, sorted_by, ChartParam};

/// Print arity threshold-sweep results ordered by `sort_by` (default `min_calls`).
pub fn chart_command(file: &str, sort_by: Option<&str>, json: bool) -> Result<()> {
    let param: ChartParam = sort_by.unwrap_or("min_calls").parse().map_err(|e: String| anyhow!(e))?;
    let entries = sorted_by(parse_chart_file(Path::new(file))?, param);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "{:<20} {:>9} {:>8} {:>8} {:>10} {:>10}",
        "program", "min_calls", "param_th", "ret_th", "param_err", "ret_err"
    );
    for e in &entries {
        println!(
            "{:<20} {:>9} {:>8.2} {:>8.2} {:>9.2}% {:>9.2}%",
            e.program,
            e.min_calls,
            e.param_threshold,
            e.ret_threshold,
            e.param_error_ratio(),
            e.ret_error_ratio()
        );
    }
    Ok(())
}
