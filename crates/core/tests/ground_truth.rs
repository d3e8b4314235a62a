use protoscope_core::model::Prototype;
use protoscope_core::truth::{GroundTruth, PrototypeDb, TruthError};

#[test]
fn loads_json_and_yaml_prototypes() {
    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("protos.json");
    std::fs::write(&json, r#"{"strlen": ["size_t", "const char *"], "abort": ["void"]}"#).unwrap();
    let yaml = dir.path().join("protos.yaml");
    std::fs::write(&yaml, "strlen:\n  - size_t\n  - const char *\n").unwrap();

    let from_json = PrototypeDb::load(&json).unwrap();
    assert_eq!(from_json.len(), 2);
    assert_eq!(from_json.prototype("abort"), Some(&Prototype::new(["void"])));

    let from_yaml = PrototypeDb::load(&yaml).unwrap();
    assert_eq!(from_yaml.prototype("strlen").unwrap().params(), ["const char *"]);
}

#[test]
fn malformed_database_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("protos.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(matches!(PrototypeDb::load(&path), Err(TruthError::Parse { .. })));
}

#[test]
fn default_classifiers() {
    let db = PrototypeDb::new();
    assert!(db.is_variadic(&Prototype::new(["int", "const char *", "..."])));
    assert!(!db.is_variadic(&Prototype::new(["int", "const char *"])));
    assert!(!db.is_variadic(&Prototype::new(["void"])));
    assert!(db.is_pseudo_function("_init"));
    assert!(db.is_pseudo_function("__libc_csu_init"));
    assert!(db.is_pseudo_function(".plt"));
    assert!(db.is_pseudo_function("puts@plt"));
    assert!(!db.is_pseudo_function("main"));
}
