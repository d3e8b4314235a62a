use std::fs;
use std::path::Path;

use protoscope::{absolute_binary_path, canonicalize_or_current, infer_project_name, sha256_file};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let cwd = std::env::current_dir().expect("cwd");
    let result = canonicalize_or_current(".").expect("canonicalize");
    assert_eq!(result, cwd);
}

#[test]
fn canonicalize_or_current_resolves_existing_path() {
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");

    let result = canonicalize_or_current(subdir.to_str().unwrap()).expect("canonicalize nested");
    assert_eq!(result, subdir.canonicalize().expect("canonicalize subdir"));
}

#[test]
fn canonicalize_or_current_joins_missing_relative_path() {
    let result = canonicalize_or_current("does-not-exist-yet").expect("join");
    assert_eq!(result, std::env::current_dir().unwrap().join("does-not-exist-yet"));
}

#[test]
fn infer_project_name_uses_last_path_component() {
    assert_eq!(infer_project_name(Path::new("/tmp/coreutils")), "coreutils");
}

#[test]
fn infer_project_name_falls_back_when_missing() {
    assert_eq!(infer_project_name(Path::new("/")), "unnamed-project");
}

#[test]
fn sha256_file_hashes_contents() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("bin");
    fs::write(&path, b"abc").unwrap();
    assert_eq!(
        sha256_file(&path).unwrap(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert!(sha256_file(&tmp.path().join("missing")).is_err());
}

#[cfg(unix)]
#[test]
fn absolute_binary_path_keeps_symlink_names() {
    let tmp = tempdir().unwrap();
    let target = tmp.path().join("python3.11");
    fs::write(&target, b"").unwrap();
    let link = tmp.path().join("python3");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let resolved = absolute_binary_path(link.to_str().unwrap()).unwrap();
    assert_eq!(resolved, link);
    assert_eq!(
        absolute_binary_path("relative-bin").unwrap(),
        std::env::current_dir().unwrap().join("relative-bin")
    );
}
