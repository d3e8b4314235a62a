use protoscope_core::db::{
    BuildRecord, DbError, LaunchRecord, ProjectDb, CURRENT_SCHEMA_VERSION,
};

fn launch(pass: &str, exit_code: Option<i32>) -> LaunchRecord {
    LaunchRecord {
        pass: pass.to_string(),
        binary: "/usr/bin/grep".to_string(),
        binary_hash: Some("abc123".to_string()),
        results_path: format!("logs/grep_{pass}_1700000000.results"),
        debug_path: format!("logs/grep_{pass}_1700000000.dbg"),
        input_path: None,
        exit_code,
        duration_ms: 1250,
        started_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

#[test]
fn fresh_db_is_at_current_schema() {
    let temp = tempfile::tempdir().unwrap();
    let db = ProjectDb::open(&temp.path().join("project.db")).unwrap();
    let version: i32 =
        db.connection().query_row("PRAGMA user_version;", [], |row| row.get(0)).unwrap();
    assert_eq!(version, CURRENT_SCHEMA_VERSION);
}

#[test]
fn launches_round_trip_and_filter_by_pass() {
    let temp = tempfile::tempdir().unwrap();
    let db_path = temp.path().join("project.db");
    {
        let db = ProjectDb::open(&db_path).unwrap();
        db.insert_launch(&launch("arity", Some(0))).unwrap();
        let mut typed = launch("type", None);
        typed.input_path = Some("logs/grep_arity_1700000000.results".to_string());
        db.insert_launch(&typed).unwrap();
        db.insert_launch(&launch("arity", Some(139))).unwrap();
    }

    // Reopening must not re-run migrations destructively.
    let db = ProjectDb::open(&db_path).unwrap();
    let all = db.list_launches(None).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[1].input_path.as_deref(), Some("logs/grep_arity_1700000000.results"));
    assert_eq!(all[1].exit_code, None);

    let arity = db.list_launches(Some("arity")).unwrap();
    assert_eq!(arity.len(), 2);
    assert_eq!(arity[1].exit_code, Some(139));
    assert!(db.list_launches(Some("couple")).unwrap().is_empty());
}

#[test]
fn builds_are_listed_in_insertion_order() {
    let temp = tempfile::tempdir().unwrap();
    let db = ProjectDb::open(&temp.path().join("project.db")).unwrap();
    for (pass, outcome) in [("arity", "rebuilt"), ("type", "failed")] {
        db.insert_build(&BuildRecord {
            pass: pass.to_string(),
            variant: format!("{pass}-release"),
            outcome: outcome.to_string(),
            finished_at: "2024-01-01T00:00:00Z".to_string(),
        })
        .unwrap();
    }
    let builds = db.list_builds().unwrap();
    let summary: Vec<_> = builds.iter().map(|b| (b.variant.as_str(), b.outcome.as_str())).collect();
    assert_eq!(summary, vec![("arity-release", "rebuilt"), ("type-release", "failed")]);
}

#[test]
fn newer_schema_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let db_path = temp.path().join("project.db");
    {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();
    }
    match ProjectDb::open(&db_path) {
        Err(DbError::UnsupportedSchemaVersion { found, max_supported, .. }) => {
            assert_eq!(found, 99);
            assert_eq!(max_supported, CURRENT_SCHEMA_VERSION);
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}
