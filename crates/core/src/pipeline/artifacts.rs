//! Artifact naming and lookup.
//!
//! Names follow `<logdir>/<basename(binary)>_<pass>_<timestamp>.<ext>`; a later
//! pass finds its input by the `<logdir>/<basename(binary)>_<pass>` prefix and
//! the `.results` suffix. Both sides build the prefix the same way, so the
//! convention must not change independently.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::model::{ArtifactKind, PassKind};
use crate::pipeline::{PipelineError, PipelineResult};

fn binary_basename(binary: &Path) -> String {
    binary.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
}

fn prefix(log_dir: &Path, binary: &Path, pass: PassKind) -> String {
    format!("{}/{}_{}", log_dir.display(), binary_basename(binary), pass)
}

/// Path of a new artifact for `binary` produced by `pass` at `timestamp`.
pub fn artifact_path(
    log_dir: &Path,
    binary: &Path,
    pass: PassKind,
    timestamp: i64,
    kind: ArtifactKind,
) -> PathBuf {
    PathBuf::from(format!("{}_{}.{}", prefix(log_dir, binary, pass), timestamp, kind.extension()))
}

/// Whether `candidate` (a `<logdir>/<file>` string) is a results file of `pass` for `binary`.
pub fn matches_results(log_dir: &Path, binary: &Path, pass: PassKind, candidate: &str) -> bool {
    candidate.starts_with(&prefix(log_dir, binary, pass))
        && candidate.ends_with(&format!(".{}", ArtifactKind::Results.extension()))
}

/// Most recently modified results file of `pass` for `binary`, if any.
///
/// Ties on modification time go to whichever candidate the directory listing
/// yields last.
pub fn resolve_latest(
    log_dir: &Path,
    pass: PassKind,
    binary: &Path,
) -> PipelineResult<Option<PathBuf>> {
    // A log dir that was never created holds no candidates.
    let entries = match fs::read_dir(log_dir) {
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        listing => listing
            .map_err(PipelineError::io(format!("Failed to read log dir {}", log_dir.display())))?,
    };

    let mut best: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(PipelineError::io("Failed to list log dir entry"))?;
        let candidate =
            format!("{}/{}", log_dir.display(), entry.file_name().to_string_lossy());
        if !matches_results(log_dir, binary, pass, &candidate) {
            continue;
        }
        let mtime = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(PipelineError::io(format!("Failed to stat {candidate}")))?;
        if best.as_ref().map(|(t, _)| mtime >= *t).unwrap_or(true) {
            best = Some((mtime, PathBuf::from(candidate)));
        }
    }

    if let Some((_, path)) = &best {
        log::debug!("resolved {} results for {}: {}", pass, binary.display(), path.display());
    }
    Ok(best.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_embed_binary_and_pass() {
        let path = artifact_path(
            Path::new("logs"),
            Path::new("/usr/bin/grep"),
            PassKind::Arity,
            1700000000,
            ArtifactKind::Results,
        );
        assert_eq!(path, PathBuf::from("logs/grep_arity_1700000000.results"));
    }

    #[test]
    fn matching_requires_results_suffix() {
        let dir = Path::new("logs");
        let bin = Path::new("/bin/grep");
        assert!(matches_results(dir, bin, PassKind::Arity, "logs/grep_arity_1.results"));
        assert!(!matches_results(dir, bin, PassKind::Arity, "logs/grep_arity_1.dbg"));
        assert!(!matches_results(dir, bin, PassKind::Arity, "logs/grep_type_1.results"));
        assert!(!matches_results(dir, bin, PassKind::Arity, "logs/ls_arity_1.results"));
    }
}
