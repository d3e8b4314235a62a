use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::analysis::{
    classify, ratio, AccuracyReport, Check, Disagreement, Evaluate, GeneralInfo, IgnoredCounts,
    MismatchReport,
};
use crate::model::{PassKind, Prototype, TypeKind, TypeRecord};
use crate::parser::{parse_type_log, ParseResult};
use crate::truth::GroundTruth;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeCounters {
    #[serde(flatten)]
    pub ignored: IgnoredCounts,
    /// Functions tested.
    pub total_tested: u64,
    /// Parameters compared (common prefix of observed and declared lists).
    pub params_tested: u64,
    pub ok_params: u64,
    pub ok_return: u64,
}

impl fmt::Display for TypeCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.ignored)?;
        writeln!(f, "Accuracy of inference")?;
        writeln!(f, "| Params Ok/Total tested:  {}/{}", self.ok_params, self.params_tested)?;
        writeln!(f, "| Return Ok/Total tested:  {}/{}", self.ok_return, self.total_tested)?;
        writeln!(f, "| Ratio params:            {:.2}%", ratio(self.ok_params, self.params_tested))?;
        writeln!(f, "- Ratio return:            {:.2}%", ratio(self.ok_return, self.total_tested))
    }
}

/// `Undef` never counts as agreement.
fn kind_agrees(observed: TypeKind, declared: &str) -> bool {
    observed != TypeKind::Undef && observed == TypeKind::from_c_type(declared)
}

/// Indices and declared types of the parameters compared for `record`.
fn compared_params<'a>(
    record: &'a TypeRecord,
    proto: &'a Prototype,
) -> impl Iterator<Item = (usize, TypeKind, &'a String)> + 'a {
    record.params.iter().zip(proto.params()).enumerate().map(|(i, (obs, decl))| (i, *obs, decl))
}

/// Type results of one program run.
#[derive(Debug, Clone)]
pub struct TypeAnalysis {
    pub program: PathBuf,
    pub logfile: PathBuf,
    pub records: Vec<TypeRecord>,
}

impl TypeAnalysis {
    pub fn load(program: &Path, logfile: &Path) -> ParseResult<Self> {
        Ok(Self::new(program, logfile, parse_type_log(logfile)?))
    }

    pub fn new(program: &Path, logfile: &Path, records: Vec<TypeRecord>) -> Self {
        Self { program: program.to_path_buf(), logfile: logfile.to_path_buf(), records }
    }

    pub fn evaluate(&self, truth: &dyn GroundTruth) -> TypeCounters {
        let mut counters = TypeCounters::default();
        for record in &self.records {
            let Some(proto) = counters.ignored.tally(classify(&record.function.name, truth))
            else {
                continue;
            };
            counters.total_tested += 1;
            if kind_agrees(record.ret, proto.ret()) {
                counters.ok_return += 1;
            }
            for (_, observed, declared) in compared_params(record, proto) {
                counters.params_tested += 1;
                if kind_agrees(observed, declared) {
                    counters.ok_params += 1;
                }
            }
        }
        counters
    }
}

impl Evaluate for TypeAnalysis {
    fn info(&self) -> GeneralInfo {
        GeneralInfo {
            pass: PassKind::Type,
            program: self.program.clone(),
            logfile: self.logfile.clone(),
            records: self.records.len(),
        }
    }

    fn accuracy(&self, truth: &dyn GroundTruth) -> AccuracyReport {
        AccuracyReport::Type(self.evaluate(truth))
    }

    fn mismatches(&self, truth: &dyn GroundTruth) -> Vec<MismatchReport> {
        let mut out = Vec::new();
        for record in &self.records {
            let Some(proto) = classify(&record.function.name, truth).tested() else {
                continue;
            };
            let mut disagreements = Vec::new();
            if !kind_agrees(record.ret, proto.ret()) {
                disagreements.push(Disagreement {
                    check: Check::Return,
                    expected: TypeKind::from_c_type(proto.ret()).to_string(),
                    observed: record.ret.to_string(),
                });
            }
            for (idx, observed, declared) in compared_params(record, proto) {
                if !kind_agrees(observed, declared) {
                    disagreements.push(Disagreement {
                        check: Check::Param(idx),
                        expected: TypeKind::from_c_type(declared).to_string(),
                        observed: observed.to_string(),
                    });
                }
            }
            if !disagreements.is_empty() {
                out.push(MismatchReport::new(
                    &record.function,
                    proto.render(&record.function.name),
                    disagreements,
                ));
            }
        }
        out
    }

    fn display_lines(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| {
                let params: Vec<&str> = r.params.iter().map(|k| k.as_str()).collect();
                format!("{}: ({}) -> {}", r.function.name, params.join(", "), r.ret)
            })
            .collect()
    }
}
