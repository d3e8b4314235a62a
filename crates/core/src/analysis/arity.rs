use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::analysis::{
    classify, flag, ratio, AccuracyReport, Check, Disagreement, Evaluate, GeneralInfo,
    IgnoredCounts, MismatchReport,
};
use crate::model::{ArityRecord, PassKind, Prototype};
use crate::parser::{parse_arity_log, ParseResult};
use crate::truth::GroundTruth;

/// Running totals for an arity evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AccuracyCounters {
    #[serde(flatten)]
    pub ignored: IgnoredCounts,
    pub total_tested: u64,
    pub ok_arity: u64,
    pub ok_return: u64,
}

impl AccuracyCounters {
    pub fn ratio_arity(&self) -> f64 {
        ratio(self.ok_arity, self.total_tested)
    }

    pub fn ratio_return(&self) -> f64 {
        ratio(self.ok_return, self.total_tested)
    }
}

impl fmt::Display for AccuracyCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.ignored)?;
        writeln!(f, "Accuracy of inference")?;
        writeln!(f, "| Params Ok/Total tested:  {}/{}", self.ok_arity, self.total_tested)?;
        writeln!(f, "| Return Ok/Total tested:  {}/{}", self.ok_return, self.total_tested)?;
        writeln!(f, "| Ratio params:            {:.2}%", self.ratio_arity())?;
        writeln!(f, "- Ratio return:            {:.2}%", self.ratio_return())
    }
}

fn arity_agrees(record: &ArityRecord, proto: &Prototype) -> bool {
    record.arity() == proto.params().len() as u64
}

fn return_agrees(record: &ArityRecord, proto: &Prototype) -> bool {
    record.returns_value() == proto.returns_value()
}

/// Classify every record and count arity/return agreement on the tested ones.
pub fn evaluate_arity(records: &[ArityRecord], truth: &dyn GroundTruth) -> AccuracyCounters {
    let mut counters = AccuracyCounters::default();
    for record in records {
        let Some(proto) = counters.ignored.tally(classify(&record.function.name, truth)) else {
            continue;
        };
        counters.total_tested += 1;
        if arity_agrees(record, proto) {
            counters.ok_arity += 1;
        }
        if return_agrees(record, proto) {
            counters.ok_return += 1;
        }
    }
    counters
}

/// Every tested record whose arity or return presence disagrees with its prototype.
pub fn arity_mismatches(records: &[ArityRecord], truth: &dyn GroundTruth) -> Vec<MismatchReport> {
    let mut out = Vec::new();
    for record in records {
        let Some(proto) = classify(&record.function.name, truth).tested() else {
            continue;
        };

        let mut disagreements = Vec::new();
        if !arity_agrees(record, proto) {
            disagreements.push(Disagreement {
                check: Check::Arity,
                expected: proto.params().len().to_string(),
                observed: record.arity().to_string(),
            });
        }
        if !return_agrees(record, proto) {
            disagreements.push(Disagreement {
                check: Check::Return,
                expected: flag(proto.returns_value()),
                observed: flag(record.returns_value()),
            });
        }
        if disagreements.is_empty() {
            continue;
        }
        out.push(MismatchReport::new(
            &record.function,
            proto.render(&record.function.name),
            disagreements,
        ));
    }
    out
}

/// Arity results of one program run.
#[derive(Debug, Clone)]
pub struct ArityAnalysis {
    pub program: PathBuf,
    pub logfile: PathBuf,
    pub records: Vec<ArityRecord>,
}

impl ArityAnalysis {
    pub fn load(program: &Path, logfile: &Path) -> ParseResult<Self> {
        Ok(Self::new(program, logfile, parse_arity_log(logfile)?))
    }

    pub fn new(program: &Path, logfile: &Path, records: Vec<ArityRecord>) -> Self {
        Self { program: program.to_path_buf(), logfile: logfile.to_path_buf(), records }
    }
}

impl Evaluate for ArityAnalysis {
    fn info(&self) -> GeneralInfo {
        GeneralInfo {
            pass: PassKind::Arity,
            program: self.program.clone(),
            logfile: self.logfile.clone(),
            records: self.records.len(),
        }
    }

    fn accuracy(&self, truth: &dyn GroundTruth) -> AccuracyReport {
        AccuracyReport::Arity(evaluate_arity(&self.records, truth))
    }

    fn mismatches(&self, truth: &dyn GroundTruth) -> Vec<MismatchReport> {
        arity_mismatches(&self.records, truth)
    }

    fn display_lines(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| {
                format!(
                    "{}:{}:{}: {} -> {}",
                    r.function.image,
                    r.function.address,
                    r.function.name,
                    r.arity(),
                    r.ret
                )
            })
            .collect()
    }
}
