//! Scoring of inferred signatures against ground truth.
//!
//! Each pass has its own evaluator (`ArityAnalysis`, `TypeAnalysis`,
//! `CoupleAnalysis`) implementing `Evaluate`; `Analysis` is the tagged
//! variant the pipeline hands out for a given pass.
//!
//! Every record is routed through `classify` in a fixed precedence order:
//! missing name, pseudo-function, unknown to the ground truth, variadic,
//! and only then tested. Ignored records land in `IgnoredCounts` and never
//! abort an evaluation.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::model::{FunctionId, PassKind, Prototype};
use crate::parser::ParseResult;
use crate::truth::GroundTruth;

pub mod arity;
pub mod couple;
pub mod types;

pub use arity::{arity_mismatches, evaluate_arity, AccuracyCounters, ArityAnalysis};
pub use couple::{CoupleAnalysis, CoupleCounters};
pub use types::{TypeAnalysis, TypeCounters};

/// Percentage of `ok` over `total`; 0.0 when nothing was tested.
pub fn ratio(ok: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        ok as f64 / total as f64 * 100.0
    }
}

/// Outcome of routing one function name through the classification precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'t> {
    WithoutName,
    PseudoFunction,
    NotFound,
    Variadic,
    Tested(&'t Prototype),
}

impl<'t> Classification<'t> {
    /// The prototype of a tested record.
    pub fn tested(self) -> Option<&'t Prototype> {
        match self {
            Classification::Tested(proto) => Some(proto),
            _ => None,
        }
    }
}

pub fn classify<'t>(name: &str, truth: &'t dyn GroundTruth) -> Classification<'t> {
    if name.is_empty() {
        return Classification::WithoutName;
    }
    if truth.is_pseudo_function(name) {
        return Classification::PseudoFunction;
    }
    let Some(proto) = truth.prototype(name) else {
        return Classification::NotFound;
    };
    if truth.is_variadic(proto) {
        return Classification::Variadic;
    }
    Classification::Tested(proto)
}

/// Records excluded from scoring, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IgnoredCounts {
    pub without_name: u64,
    pub variadic: u64,
    pub pseudo_function: u64,
    pub not_found: u64,
}

impl IgnoredCounts {
    /// Count an ignored classification; returns the prototype for tested ones.
    pub fn tally<'t>(&mut self, class: Classification<'t>) -> Option<&'t Prototype> {
        match class {
            Classification::WithoutName => self.without_name += 1,
            Classification::PseudoFunction => self.pseudo_function += 1,
            Classification::NotFound => self.not_found += 1,
            Classification::Variadic => self.variadic += 1,
            Classification::Tested(proto) => return Some(proto),
        }
        None
    }

    pub fn total(&self) -> u64 {
        self.without_name + self.variadic + self.pseudo_function + self.not_found
    }
}

impl fmt::Display for IgnoredCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ignored")?;
        writeln!(f, "| Without name:            {}", self.without_name)?;
        writeln!(f, "| Variadic:                {}", self.variadic)?;
        writeln!(f, "| Pseudo-Functions:        {}", self.pseudo_function)?;
        writeln!(f, "- Not in binary/source:    {}", self.not_found)
    }
}

/// What an evaluator checked for a disagreeing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "check", content = "index", rename_all = "snake_case")]
pub enum Check {
    Arity,
    Return,
    Param(usize),
    Couple,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Arity => f.write_str("Arity "),
            Check::Return => f.write_str("Return"),
            Check::Param(idx) => write!(f, "Param {idx}"),
            Check::Couple => f.write_str("Couple"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disagreement {
    pub check: Check,
    pub expected: String,
    pub observed: String,
}

/// One tested record whose inference disagrees with the ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MismatchReport {
    pub image: String,
    pub address: String,
    pub function: String,
    pub prototype: String,
    pub disagreements: Vec<Disagreement>,
}

impl MismatchReport {
    pub fn new(function: &FunctionId, prototype: String, disagreements: Vec<Disagreement>) -> Self {
        Self {
            image: function.image.clone(),
            address: format!("0x{:x}", function.address),
            function: function.name.clone(),
            prototype,
            disagreements,
        }
    }

    pub fn disagrees_on(&self, check: Check) -> bool {
        self.disagreements.iter().any(|d| d.check == check)
    }
}

impl fmt::Display for MismatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}@{}] {}", self.image, self.address, self.prototype)?;
        for d in &self.disagreements {
            writeln!(f, "   {} : Expected {} got {}", d.check, d.expected, d.observed)?;
        }
        Ok(())
    }
}

/// Summary printed before any report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralInfo {
    pub pass: PassKind,
    pub program: PathBuf,
    pub logfile: PathBuf,
    pub records: usize,
}

impl fmt::Display for GeneralInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Information about {} inference", self.pass)?;
        writeln!(f, "| Program:                 {}", self.program.display())?;
        writeln!(f, "| Logfile:                 {}", self.logfile.display())?;
        writeln!(f, "- Records:                 {}", self.records)
    }
}

/// Accuracy summary for any pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "pass", rename_all = "snake_case")]
pub enum AccuracyReport {
    Arity(AccuracyCounters),
    Type(TypeCounters),
    Couple(CoupleCounters),
}

impl AccuracyReport {
    pub fn ignored(&self) -> &IgnoredCounts {
        match self {
            AccuracyReport::Arity(c) => &c.ignored,
            AccuracyReport::Type(c) => &c.ignored,
            AccuracyReport::Couple(c) => &c.ignored,
        }
    }

    /// `(checks that agreed, checks performed)` across the whole report.
    pub fn score(&self) -> (u64, u64) {
        match self {
            AccuracyReport::Arity(c) => (c.ok_arity + c.ok_return, 2 * c.total_tested),
            AccuracyReport::Type(c) => {
                (c.ok_params + c.ok_return, c.params_tested + c.total_tested)
            }
            AccuracyReport::Couple(c) => (c.ok_couples, c.total_tested),
        }
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccuracyReport::Arity(c) => fmt::Display::fmt(c, f),
            AccuracyReport::Type(c) => fmt::Display::fmt(c, f),
            AccuracyReport::Couple(c) => fmt::Display::fmt(c, f),
        }
    }
}

/// The evaluate/report contract shared by every pass.
pub trait Evaluate {
    fn info(&self) -> GeneralInfo;
    fn accuracy(&self, truth: &dyn GroundTruth) -> AccuracyReport;
    fn mismatches(&self, truth: &dyn GroundTruth) -> Vec<MismatchReport>;
    /// One line per parsed record.
    fn display_lines(&self) -> Vec<String>;
}

/// Evaluator selected by pass.
#[derive(Debug, Clone)]
pub enum Analysis {
    Arity(ArityAnalysis),
    Type(TypeAnalysis),
    Couple(CoupleAnalysis),
}

impl Analysis {
    /// Parse `logfile` with the parser matching `pass`.
    pub fn load(pass: PassKind, program: &Path, logfile: &Path) -> ParseResult<Self> {
        Ok(match pass {
            PassKind::Arity => Analysis::Arity(ArityAnalysis::load(program, logfile)?),
            PassKind::Type => Analysis::Type(TypeAnalysis::load(program, logfile)?),
            PassKind::Couple => Analysis::Couple(CoupleAnalysis::load(program, logfile)?),
        })
    }

    pub fn pass(&self) -> PassKind {
        match self {
            Analysis::Arity(_) => PassKind::Arity,
            Analysis::Type(_) => PassKind::Type,
            Analysis::Couple(_) => PassKind::Couple,
        }
    }

    fn evaluator(&self) -> &dyn Evaluate {
        match self {
            Analysis::Arity(a) => a,
            Analysis::Type(a) => a,
            Analysis::Couple(a) => a,
        }
    }
}

impl Evaluate for Analysis {
    fn info(&self) -> GeneralInfo {
        self.evaluator().info()
    }

    fn accuracy(&self, truth: &dyn GroundTruth) -> AccuracyReport {
        self.evaluator().accuracy(truth)
    }

    fn mismatches(&self, truth: &dyn GroundTruth) -> Vec<MismatchReport> {
        self.evaluator().mismatches(truth)
    }

    fn display_lines(&self) -> Vec<String> {
        self.evaluator().display_lines()
    }
}

pub(crate) fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}
