use std::fs;

use protoscope_core::db::{ProjectConfig, ProjectContext, ProjectLayout};
use protoscope_core::model::PassKind;

fn write_project(root: &std::path::Path, config: &ProjectConfig) {
    let layout = ProjectLayout::new(root);
    fs::create_dir_all(&layout.meta_dir).unwrap();
    fs::write(&layout.project_config_path, serde_json::to_string_pretty(config).unwrap()).unwrap();
}

fn configured(name: &str) -> ProjectConfig {
    let mut config = ProjectConfig::new(name, ".protoscope/project.db");
    config.engine.bin = "pin".into();
    config.engine.path = "/opt/pin".into();
    config
}

#[test]
fn context_resolves_passes_against_root() {
    let temp = tempfile::tempdir().unwrap();
    write_project(temp.path(), &configured("demo"));

    let ctx = ProjectContext::from_root(temp.path()).unwrap();
    assert_eq!(ctx.config.name, "demo");
    assert_eq!(ctx.db_path, temp.path().join(".protoscope/project.db"));
    assert_eq!(ctx.log_dir(), temp.path().join("logs"));

    let pipeline = ctx.pipeline().unwrap();
    assert_eq!(pipeline.registry().requirements(PassKind::Couple), vec![PassKind::Arity, PassKind::Type]);
    let couple = pipeline.pintool(PassKind::Couple).unwrap();
    assert_eq!(couple.code(), 2);
    assert_eq!(couple.obj_path(), temp.path().join("pintool/obj/couple.so"));
    assert_eq!(couple.log_dir(), temp.path().join("logs"));
}

#[test]
fn unset_engine_fails_pipeline_configuration() {
    let temp = tempfile::tempdir().unwrap();
    write_project(temp.path(), &ProjectConfig::new("bare", ".protoscope/project.db"));

    let ctx = ProjectContext::from_root(temp.path()).unwrap();
    let err = ctx.pipeline().unwrap_err();
    assert!(format!("{err:#}").contains("parameter engine.bin expected"));
}

#[test]
fn ground_truth_requires_configured_prototypes() {
    let temp = tempfile::tempdir().unwrap();
    let mut config = configured("demo");
    write_project(temp.path(), &config);
    let ctx = ProjectContext::from_root(temp.path()).unwrap();
    assert!(ctx.ground_truth().unwrap_err().to_string().contains("No prototype database"));

    fs::write(temp.path().join("protos.yaml"), "strlen: [size_t, \"const char *\"]\n").unwrap();
    config.prototypes = Some("protos.yaml".into());
    write_project(temp.path(), &config);
    let ctx = ProjectContext::from_root(temp.path()).unwrap();
    assert_eq!(ctx.ground_truth().unwrap().len(), 1);
}

#[test]
fn missing_project_config_is_reported() {
    let temp = tempfile::tempdir().unwrap();
    let err = ProjectContext::from_root(temp.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to read project config"));
}
