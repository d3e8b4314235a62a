//! Building instrumentation modules.
//!
//! The build tool owns staleness; this layer compares the variant's
//! modification time before and after the build to report whether anything
//! changed, and only copies the module into `obj_path` after a successful
//! build. The copy is a plain overwrite.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::pipeline::config::DEFAULT_COMPILE_FLAGS_VAR;
use crate::pipeline::pintool::render_command;
use crate::pipeline::{Pintool, PipelineError, PipelineResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Ask the build tool to rebuild unconditionally (`-B`).
    pub force: bool,
    pub debug: bool,
    pub trace: bool,
}

impl BuildOptions {
    pub fn variant_suffix(&self) -> &'static str {
        match (self.debug, self.trace) {
            (false, false) => "-release",
            (true, false) => "-debug",
            (false, true) => "-trace",
            (true, true) => "-debug-trace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BuildOutcome {
    UpToDate,
    Rebuilt,
    /// The build tool exited unsuccessfully; `obj_path` was left untouched.
    Failed { code: Option<i32> },
}

impl BuildOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self, BuildOutcome::Failed { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildOutcome::UpToDate => "up_to_date",
            BuildOutcome::Rebuilt => "rebuilt",
            BuildOutcome::Failed { .. } => "failed",
        }
    }
}

fn mtime_or_epoch(path: &Path) -> SystemTime {
    fs::metadata(path).and_then(|m| m.modified()).unwrap_or(SystemTime::UNIX_EPOCH)
}

impl Pintool {
    /// Module name for a build variant, e.g. `arity-release`.
    pub fn variant_name(&self, options: BuildOptions) -> String {
        let stem = self
            .src_path()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.pass().kind.to_string());
        format!("{stem}{}", options.variant_suffix())
    }

    /// `<absolute obj dir>/build`.
    pub fn build_dir(&self) -> PipelineResult<PathBuf> {
        let obj_dir = self.obj_path().parent().unwrap_or_else(|| Path::new(""));
        let obj_dir = if obj_dir.is_absolute() {
            obj_dir.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(PipelineError::io("Failed to get current directory"))?
                .join(obj_dir)
        };
        Ok(obj_dir.join("build"))
    }

    /// Path of the compiled variant inside the build dir.
    pub fn build_file(&self, options: BuildOptions) -> PipelineResult<PathBuf> {
        Ok(self.build_dir()?.join(format!("{}.so", self.variant_name(options))))
    }

    /// `make [-B] PIN_ROOT=.. SCAT_COMPILE_FLAGS=.. OBJDIR=<build>/ <build>/<variant>.so`,
    /// run from the source directory.
    pub fn build_command(&self, options: BuildOptions) -> PipelineResult<Command> {
        let build_dir = self.build_dir()?;
        let engine = self.engine();
        let mut cmd = Command::new(engine.make.as_deref().unwrap_or_else(|| Path::new("make")));
        if options.force {
            cmd.arg("-B");
        }
        cmd.arg(format!("PIN_ROOT={}", engine.path.display()));
        cmd.arg(format!(
            "{}={}",
            engine.compile_flags_var.as_deref().unwrap_or(DEFAULT_COMPILE_FLAGS_VAR),
            engine.compile_flags.as_deref().unwrap_or("")
        ));
        cmd.arg(format!("OBJDIR={}/", build_dir.display()));
        cmd.arg(self.build_file(options)?);
        if let Some(src_dir) = self.src_path().parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(src_dir);
        }
        Ok(cmd)
    }

    /// Compile this pass's module if needed and copy it to `obj_path`.
    pub fn ensure_built(&self, options: BuildOptions) -> PipelineResult<BuildOutcome> {
        let build_dir = self.build_dir()?;
        fs::create_dir_all(&build_dir).map_err(PipelineError::io(format!(
            "Failed to create build dir {}",
            build_dir.display()
        )))?;

        let build_file = self.build_file(options)?;
        let before = mtime_or_epoch(&build_file);

        let mut cmd = self.build_command(options)?;
        self.say(&format!("Compiling pintool: {} ...", self.variant_name(options)));
        log::debug!("build command: {}", render_command(&cmd));
        let status = cmd
            .stdout(Stdio::null())
            .status()
            .map_err(PipelineError::io(format!("Failed to spawn build for {}", self.pass().kind)))?;

        if !status.success() {
            let msg = format!("Compilation exited with non-zero status {status}");
            log::warn!("{} build failed: {status}", self.pass().kind);
            self.say(&msg);
            return Ok(BuildOutcome::Failed { code: status.code() });
        }

        let after = fs::metadata(&build_file)
            .and_then(|m| m.modified())
            .map_err(PipelineError::io(format!("Build produced no {}", build_file.display())))?;
        fs::copy(&build_file, self.obj_path()).map_err(PipelineError::io(format!(
            "Failed to copy {} to {}",
            build_file.display(),
            self.obj_path().display()
        )))?;

        if before == after {
            self.say("\t=> Up to date !");
            Ok(BuildOutcome::UpToDate)
        } else {
            self.say("\t=> Done !");
            Ok(BuildOutcome::Rebuilt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_suffixes_combine_debug_and_trace() {
        let opts = |debug, trace| BuildOptions { force: false, debug, trace };
        assert_eq!(opts(false, false).variant_suffix(), "-release");
        assert_eq!(opts(true, false).variant_suffix(), "-debug");
        assert_eq!(opts(false, true).variant_suffix(), "-trace");
        assert_eq!(opts(true, true).variant_suffix(), "-debug-trace");
    }
}
