//! Threshold-sweep results for the arity pass.
//!
//! Each line records, for one program and one set of inference thresholds,
//! how many parameter (`in`) and return (`out`) inferences were false
//! negatives, false positives, and the total checked:
//! `pgm:min_calls:param_th:ret_th:fn_in:fp_in:tot_in:fn_out:fp_out:tot_out`.

use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::analysis::ratio;
use crate::parser::{numbered_lines, read_log, LineCtx, ParseResult};

/// Threshold parameter a chart is plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartParam {
    MinCalls,
    ParamThreshold,
    RetThreshold,
}

impl FromStr for ChartParam {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min_calls" => Ok(ChartParam::MinCalls),
            "param_threshold" => Ok(ChartParam::ParamThreshold),
            "ret_threshold" => Ok(ChartParam::RetThreshold),
            other => Err(format!(
                "Unknown chart parameter '{other}'. Allowed: min_calls, param_threshold, ret_threshold"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArityChartEntry {
    pub program: String,
    pub min_calls: u32,
    pub param_threshold: f64,
    pub ret_threshold: f64,
    pub fn_in: u64,
    pub fp_in: u64,
    pub tot_in: u64,
    pub fn_out: u64,
    pub fp_out: u64,
    pub tot_out: u64,
}

impl ArityChartEntry {
    pub fn get(&self, param: ChartParam) -> f64 {
        match param {
            ChartParam::MinCalls => f64::from(self.min_calls),
            ChartParam::ParamThreshold => self.param_threshold,
            ChartParam::RetThreshold => self.ret_threshold,
        }
    }

    /// Share of parameter inferences that were wrong, in percent.
    pub fn param_error_ratio(&self) -> f64 {
        ratio(self.fn_in + self.fp_in, self.tot_in)
    }

    /// Share of return inferences that were wrong, in percent.
    pub fn ret_error_ratio(&self) -> f64 {
        ratio(self.fn_out + self.fp_out, self.tot_out)
    }
}

pub fn parse_chart_file(path: &Path) -> ParseResult<Vec<ArityChartEntry>> {
    let body = read_log(path)?;
    parse_chart(&body, path)
}

pub fn parse_chart(body: &str, path: &Path) -> ParseResult<Vec<ArityChartEntry>> {
    numbered_lines(body)
        .map(|(line, text)| {
            let ctx = LineCtx { path, line };
            let f = ctx.fields(text, 10)?;
            Ok(ArityChartEntry {
                program: f[0].to_string(),
                min_calls: ctx.number(f[1], "min_calls")?,
                param_threshold: ctx.number(f[2], "param threshold")?,
                ret_threshold: ctx.number(f[3], "return threshold")?,
                fn_in: ctx.number(f[4], "fn_in")?,
                fp_in: ctx.number(f[5], "fp_in")?,
                tot_in: ctx.number(f[6], "tot_in")?,
                fn_out: ctx.number(f[7], "fn_out")?,
                fp_out: ctx.number(f[8], "fp_out")?,
                tot_out: ctx.number(f[9], "tot_out")?,
            })
        })
        .collect()
}

/// Entries ordered by `param`, ascending.
pub fn sorted_by(mut entries: Vec<ArityChartEntry>, param: ChartParam) -> Vec<ArityChartEntry> {
    entries.sort_by(|a, b| a.get(param).total_cmp(&b.get(param)));
    entries
}
