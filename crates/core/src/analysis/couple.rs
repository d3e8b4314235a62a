use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::analysis::{
    classify, ratio, AccuracyReport, Check, Classification, Disagreement, Evaluate, GeneralInfo,
    IgnoredCounts, MismatchReport,
};
use crate::model::{CoupleRecord, PassKind, Prototype, TypeKind};
use crate::parser::{parse_couple_log, ParseResult};
use crate::truth::GroundTruth;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CoupleCounters {
    #[serde(flatten)]
    pub ignored: IgnoredCounts,
    pub total_tested: u64,
    pub ok_couples: u64,
}

impl fmt::Display for CoupleCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.ignored)?;
        writeln!(f, "Accuracy of inference")?;
        writeln!(f, "| Couples Ok/Total tested: {}/{}", self.ok_couples, self.total_tested)?;
        writeln!(f, "- Ratio couples:           {:.2}%", ratio(self.ok_couples, self.total_tested))
    }
}

/// Classify both ends; the first end that is not tested decides the bucket.
fn classify_couple<'t>(
    record: &CoupleRecord,
    truth: &'t dyn GroundTruth,
) -> Result<(&'t Prototype, &'t Prototype), Classification<'t>> {
    let producer = classify(&record.producer.name, truth);
    let Some(p) = producer.tested() else {
        return Err(producer);
    };
    let consumer = classify(&record.consumer.name, truth);
    let Some(c) = consumer.tested() else {
        return Err(consumer);
    };
    Ok((p, c))
}

/// A couple holds when an address-returning producer feeds an address parameter.
fn couple_agrees(record: &CoupleRecord, producer: &Prototype, consumer: &Prototype) -> bool {
    let param_is_addr = consumer
        .params()
        .get(record.param)
        .map(|ty| TypeKind::from_c_type(ty) == TypeKind::Addr)
        .unwrap_or(false);
    TypeKind::from_c_type(producer.ret()) == TypeKind::Addr && param_is_addr
}

/// Couple results of one program run.
#[derive(Debug, Clone)]
pub struct CoupleAnalysis {
    pub program: PathBuf,
    pub logfile: PathBuf,
    pub records: Vec<CoupleRecord>,
}

impl CoupleAnalysis {
    pub fn load(program: &Path, logfile: &Path) -> ParseResult<Self> {
        Ok(Self::new(program, logfile, parse_couple_log(logfile)?))
    }

    pub fn new(program: &Path, logfile: &Path, records: Vec<CoupleRecord>) -> Self {
        Self { program: program.to_path_buf(), logfile: logfile.to_path_buf(), records }
    }

    pub fn evaluate(&self, truth: &dyn GroundTruth) -> CoupleCounters {
        let mut counters = CoupleCounters::default();
        for record in &self.records {
            match classify_couple(record, truth) {
                Err(class) => {
                    counters.ignored.tally(class);
                }
                Ok((producer, consumer)) => {
                    counters.total_tested += 1;
                    if couple_agrees(record, producer, consumer) {
                        counters.ok_couples += 1;
                    }
                }
            }
        }
        counters
    }
}

impl Evaluate for CoupleAnalysis {
    fn info(&self) -> GeneralInfo {
        GeneralInfo {
            pass: PassKind::Couple,
            program: self.program.clone(),
            logfile: self.logfile.clone(),
            records: self.records.len(),
        }
    }

    fn accuracy(&self, truth: &dyn GroundTruth) -> AccuracyReport {
        AccuracyReport::Couple(self.evaluate(truth))
    }

    fn mismatches(&self, truth: &dyn GroundTruth) -> Vec<MismatchReport> {
        self.records
            .iter()
            .filter_map(|record| {
                let (producer, consumer) = classify_couple(record, truth).ok()?;
                if couple_agrees(record, producer, consumer) {
                    return None;
                }
                let declared = consumer
                    .params()
                    .get(record.param)
                    .map(|ty| TypeKind::from_c_type(ty).to_string())
                    .unwrap_or_else(|| "none".to_string());
                Some(MismatchReport::new(
                    &record.producer,
                    format!(
                        "{} => {} #{}",
                        producer.render(&record.producer.name),
                        consumer.render(&record.consumer.name),
                        record.param
                    ),
                    vec![Disagreement {
                        check: Check::Couple,
                        expected: format!(
                            "{} -> {}",
                            TypeKind::from_c_type(producer.ret()),
                            declared
                        ),
                        observed: "ADDR -> ADDR".to_string(),
                    }],
                ))
            })
            .collect()
    }

    fn display_lines(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| format!("{} -> {} #{}", r.producer.name, r.consumer.name, r.param))
            .collect()
    }
}
