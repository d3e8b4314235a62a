use std::path::Path;

use protoscope_core::analysis::{
    arity_mismatches, evaluate_arity, ratio, AccuracyReport, ArityAnalysis, Check, Evaluate,
};
use protoscope_core::model::{ArityRecord, FunctionId, Prototype};
use protoscope_core::truth::PrototypeDb;

fn record(name: &str, counts: (u32, u32, u32, u32), ret: u32) -> ArityRecord {
    ArityRecord {
        function: FunctionId { image: "/bin/grep".into(), address: 0x1000, name: name.into() },
        int_reg: counts.0,
        int_stack: counts.1,
        float_reg: counts.2,
        float_stack: counts.3,
        ret,
    }
}

fn truth() -> PrototypeDb {
    let mut db = PrototypeDb::new();
    db.insert("add", Prototype::new(["int", "int", "int"]))
        .insert("put", Prototype::new(["void", "char*"]))
        .insert("printf", Prototype::new(["int", "const char *", "..."]))
        .insert("frame_dummy", Prototype::new(["void"]));
    db
}

#[test]
fn matching_arity_and_return_both_count() {
    let counters = evaluate_arity(&[record("add", (2, 0, 0, 0), 1)], &truth());
    assert_eq!(counters.total_tested, 1);
    assert_eq!(counters.ok_arity, 1);
    assert_eq!(counters.ok_return, 1);
}

#[test]
fn void_function_with_observed_return_only_counts_arity() {
    let records = [record("put", (1, 0, 0, 0), 1)];
    let counters = evaluate_arity(&records, &truth());
    assert_eq!(counters.ok_arity, 1);
    assert_eq!(counters.ok_return, 0);

    let mismatches = arity_mismatches(&records, &truth());
    assert_eq!(mismatches.len(), 1);
    assert!(mismatches[0].disagrees_on(Check::Return));
    assert!(!mismatches[0].disagrees_on(Check::Arity));
    let rendered = mismatches[0].to_string();
    assert!(rendered.contains("Return : Expected 0 got 1"), "{rendered}");
    assert!(rendered.starts_with("[/bin/grep@0x1000] put (char*) -> void"), "{rendered}");
}

#[test]
fn empty_name_is_counted_without_name_only() {
    // Even a name-less record whose other fields would match something stays out.
    let counters = evaluate_arity(&[record("", (2, 0, 0, 0), 1)], &truth());
    assert_eq!(counters.ignored.without_name, 1);
    assert_eq!(counters.ignored.pseudo_function, 0);
    assert_eq!(counters.ignored.not_found, 0);
    assert_eq!(counters.total_tested, 0);
}

#[test]
fn variadic_pseudo_and_unknown_are_excluded() {
    let records = [
        record("printf", (1, 0, 0, 0), 1),
        record("frame_dummy", (0, 0, 0, 0), 0),
        record("mystery", (3, 0, 0, 0), 1),
    ];
    let counters = evaluate_arity(&records, &truth());
    assert_eq!(counters.ignored.variadic, 1);
    assert_eq!(counters.ignored.pseudo_function, 1);
    assert_eq!(counters.ignored.not_found, 1);
    assert_eq!((counters.total_tested, counters.ok_arity, counters.ok_return), (0, 0, 0));
    assert!(arity_mismatches(&records, &truth()).is_empty());
}

#[test]
fn every_record_lands_in_exactly_one_bucket() {
    let records = [
        record("add", (2, 0, 0, 0), 1),
        record("add", (1, 1, 1, 0), 0),
        record("put", (0, 0, 1, 0), 0),
        record("", (1, 0, 0, 0), 0),
        record("printf", (2, 0, 0, 0), 1),
        record("frame_dummy", (0, 0, 0, 0), 0),
        record("nope", (0, 0, 0, 0), 0),
    ];
    let counters = evaluate_arity(&records, &truth());
    assert_eq!(counters.ignored.total() + counters.total_tested, records.len() as u64);
    assert_eq!(counters.total_tested, 3);
    assert_eq!(counters.ok_arity, 2);
    assert_eq!(counters.ok_return, 2);
}

#[test]
fn all_mismatches_are_reported() {
    let records = [
        record("add", (3, 0, 0, 0), 1),
        record("put", (2, 0, 0, 0), 1),
        record("add", (2, 0, 0, 0), 1),
    ];
    let mismatches = arity_mismatches(&records, &truth());
    assert_eq!(mismatches.len(), 2);
    assert_eq!(mismatches[0].function, "add");
    assert_eq!(mismatches[0].address, "0x1000");
    assert!(mismatches[0].to_string().contains("Arity  : Expected 2 got 3"));
    assert!(mismatches[1].disagrees_on(Check::Arity));
    assert!(mismatches[1].disagrees_on(Check::Return));
}

#[test]
fn ratio_is_zero_without_tests() {
    assert_eq!(ratio(0, 0), 0.0);
    assert_eq!(ratio(7, 0), 0.0);
    assert_eq!(ratio(1, 4), 25.0);
}

#[test]
fn analysis_reports_accuracy_and_score() {
    let analysis = ArityAnalysis::new(
        Path::new("/bin/grep"),
        Path::new("logs/grep_arity_1.results"),
        vec![record("add", (2, 0, 0, 0), 1), record("put", (1, 0, 0, 0), 1)],
    );
    let report = analysis.accuracy(&truth());
    assert_eq!(report.score(), (3, 4));
    match &report {
        AccuracyReport::Arity(c) => assert_eq!(c.ratio_return(), 50.0),
        other => panic!("unexpected report {other:?}"),
    }
    let text = report.to_string();
    assert!(text.contains("| Params Ok/Total tested:  2/2"), "{text}");
    assert!(text.contains("- Ratio return:            50.00%"), "{text}");

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["pass"], "arity");
    assert_eq!(json["without_name"], 0);
    assert_eq!(json["ok_return"], 1);

    assert_eq!(analysis.display_lines()[0], "/bin/grep:4096:add: 2 -> 1");
    assert_eq!(analysis.info().records, 2);
}

#[test]
fn huge_observed_counts_disagree_instead_of_wrapping() {
    let records = [record("add", (u32::MAX, u32::MAX, 2, 0), 1)];
    let counters = evaluate_arity(&records, &truth());
    assert_eq!(counters.total_tested, 1);
    assert_eq!(counters.ok_arity, 0);
    let mismatches = arity_mismatches(&records, &truth());
    assert!(mismatches[0].to_string().contains("Arity  : Expected 2 got 8589934592"));
}
