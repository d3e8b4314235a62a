#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use predicates::prelude::*;
use protoscope_core::db::{ProjectConfig, ProjectDb, ProjectLayout};

/// Writes an arity line for `main` to the `-o` file and exits non-zero.
const FAKE_ENGINE: &str = r#"
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    --) break ;;
  esac
  shift
done
echo "/bin/true:4096:main:2:0:0:0:1" > "$out"
echo "program output"
exit 1
"#;

/// Creates its last argument if missing.
const FAKE_MAKE: &str = "#!/bin/sh\nfor a in \"$@\"; do target=\"$a\"; done\n[ -f \"$target\" ] || echo built > \"$target\"\n";

fn protoscope() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("protoscope")
}

fn configure(root: &Path, prototypes: &str) {
    let engine = root.join("engine.sh");
    fs::write(&engine, FAKE_ENGINE).unwrap();
    let make = root.join("make.sh");
    fs::write(&make, FAKE_MAKE).unwrap();
    fs::set_permissions(&make, fs::Permissions::from_mode(0o755)).unwrap();
    fs::create_dir_all(root.join("pintool")).unwrap();
    fs::write(root.join("protos.json"), prototypes).unwrap();

    let layout = ProjectLayout::new(root);
    let mut config: ProjectConfig =
        serde_json::from_str(&fs::read_to_string(&layout.project_config_path).unwrap()).unwrap();
    config.engine.bin = "/bin/sh".into();
    config.engine.path = root.join("pin");
    config.engine.cli_options = Some(engine.display().to_string());
    config.engine.make = Some(make);
    config.prototypes = Some("protos.json".into());
    fs::write(&layout.project_config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
}

// One test so the helper scripts never run while another test thread forks.
#[test]
fn launch_then_evaluate_through_the_cli() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let root_arg = root.to_str().unwrap();
    protoscope().args(["init-project", "--root", root_arg]).assert().success();
    configure(root, r#"{ "main": ["void", "int"] }"#);

    let program = root.join("prog");
    fs::write(&program, b"not really elf").unwrap();

    // Skipping arity is refused before anything runs.
    protoscope()
        .args(["launch", "--root", root_arg, "--pass", "type", "--no-build"])
        .arg(&program)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot find results from arity inference"));

    protoscope()
        .args(["launch", "--root", root_arg, "--pass", "arity", "--transcript"])
        .arg(&program)
        .args(["--", "-x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiling pintool: arity-release ..."))
        .stdout(predicate::str::contains("Inference results logged in"));
    assert!(root.join("pintool/obj/arity.so").is_file());

    let db = ProjectDb::open(&ProjectLayout::new(root).db_path).unwrap();
    let launches = db.list_launches(Some("arity")).unwrap();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].exit_code, Some(1));
    assert!(launches[0].results_path.ends_with(".results"));
    assert!(launches[0].binary_hash.is_some());
    assert_eq!(db.list_builds().unwrap()[0].outcome, "rebuilt");

    let transcript = launches[0].results_path.replace(".results", ".log");
    assert_eq!(fs::read_to_string(transcript).unwrap().trim(), "program output");

    protoscope()
        .args(["accuracy", "--root", root_arg, "--pass", "arity", "prog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| Params Ok/Total tested:  0/1"))
        .stdout(predicate::str::contains("| Return Ok/Total tested:  0/1"));

    protoscope()
        .args(["mismatch", "--root", root_arg, "--pass", "arity", "prog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[/bin/true@0x1000] main (int) -> void"))
        .stdout(predicate::str::contains("Arity  : Expected 1 got 2"))
        .stdout(predicate::str::contains("Return : Expected 0 got 1"));

    protoscope()
        .args(["display", "--root", root_arg, "--pass", "arity", "prog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/bin/true:4096:main: 2 -> 1"));

    protoscope()
        .args(["launch", "--root", root_arg, "--pass", "type", "--quiet"])
        .arg(&program)
        .assert()
        .success();
    let output = protoscope().args(["runs", "--root", root_arg, "--json"]).output().unwrap();
    let runs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let launches = runs["launches"].as_array().unwrap();
    assert_eq!(launches.len(), 2);
    assert_eq!(launches[1]["input_path"], launches[0]["results_path"]);
    assert_eq!(runs["builds"].as_array().unwrap().len(), 2);

    // Artifacts are filed under the name given, not the symlink target.
    let versioned = root.join("tool-1.2");
    fs::write(&versioned, b"versioned").unwrap();
    let link = root.join("tool");
    std::os::unix::fs::symlink(&versioned, &link).unwrap();
    protoscope()
        .args(["launch", "--root", root_arg, "--pass", "arity", "--no-build", "--quiet"])
        .arg(&link)
        .assert()
        .success();
    let names: Vec<String> = fs::read_dir(root.join("logs"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert!(names.iter().any(|n| n.starts_with("tool_arity_") && n.ends_with(".results")), "{names:?}");
    assert!(!names.iter().any(|n| n.starts_with("tool-1.2_")), "{names:?}");
    protoscope()
        .args(["accuracy", "--root", root_arg, "--pass", "arity"])
        .arg(&link)
        .assert()
        .success()
        .stdout(predicate::str::contains("| Params Ok/Total tested:  0/1"));

    // A bare build covers every registered pass in order.
    protoscope().args(["build", "--root", root_arg]).assert().success();
    let db = ProjectDb::open(&ProjectLayout::new(root).db_path).unwrap();
    let builds: Vec<(String, String)> =
        db.list_builds().unwrap().into_iter().skip(2).map(|b| (b.pass, b.outcome)).collect();
    assert_eq!(
        builds,
        vec![
            ("arity".to_string(), "up_to_date".to_string()),
            ("type".to_string(), "up_to_date".to_string()),
            ("couple".to_string(), "rebuilt".to_string()),
        ]
    );
    assert!(root.join("pintool/obj/couple.so").is_file());
}
