use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;

use crate::analysis::Analysis;
use crate::model::{ArtifactKind, LogArtifact, Pass, PassKind};
use crate::pipeline::artifacts::{artifact_path, resolve_latest};
use crate::pipeline::{EngineConfig, PintoolConfig, PipelineError, PipelineResult, Sink};

/// Per-launch switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Emit the command line and timing through the stdout sink.
    pub verbose: bool,
    /// Redirect the instrumented process's stdout/stderr into a `.log` artifact.
    pub transcript: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self { verbose: true, transcript: false }
    }
}

/// What one instrumented run produced.
///
/// `exit_code` is recorded only: a failing instrumented run is not turned
/// into an error at this layer.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchOutcome {
    pub results: LogArtifact,
    pub debug: LogArtifact,
    pub transcript: Option<LogArtifact>,
    /// Predecessor results handed to the engine with `-i`.
    pub input: Option<PathBuf>,
    pub command: String,
    pub duration: Duration,
    pub exit_code: Option<i32>,
}

/// One configured pass: its instrumentation module and where its artifacts go.
pub struct Pintool {
    pass: Pass,
    src_path: PathBuf,
    obj_path: PathBuf,
    engine: EngineConfig,
    log_dir: PathBuf,
    stdout: Sink,
    stderr: Sink,
}

fn require(value: &Path, param: &str) -> PipelineResult<()> {
    if value.as_os_str().is_empty() {
        return Err(PipelineError::Config(format!("parameter {param} expected")));
    }
    Ok(())
}

fn log_stdout() -> Sink {
    Arc::new(|msg: &str| log::info!("{msg}"))
}

fn log_stderr() -> Sink {
    Arc::new(|msg: &str| log::error!("{msg}"))
}

/// Render a command as a single shell-like line for display.
pub(crate) fn render_command(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().to_string()));
    parts.join(" ")
}

impl Pintool {
    /// Validate `config` and bind it to a registered pass.
    pub fn new(config: PintoolConfig, pass: Pass) -> PipelineResult<Self> {
        if config.name.trim().is_empty() {
            return Err(PipelineError::Config("parameter name expected".into()));
        }
        require(&config.src_path, "src_path")?;
        require(&config.obj_path, "obj_path")?;
        require(&config.log_dir, "log_dir")?;
        require(&config.engine.bin, "engine.bin")?;
        require(&config.engine.path, "engine.path")?;
        if config.name != pass.kind.as_str() {
            return Err(PipelineError::Config(format!(
                "config for '{}' bound to pass {}",
                config.name, pass.kind
            )));
        }

        Ok(Self {
            pass,
            src_path: config.src_path,
            obj_path: config.obj_path,
            engine: config.engine,
            log_dir: config.log_dir,
            stdout: config.on_stdout.unwrap_or_else(log_stdout),
            stderr: config.on_stderr.unwrap_or_else(log_stderr),
        })
    }

    pub fn pass(&self) -> Pass {
        self.pass
    }

    pub fn code(&self) -> usize {
        self.pass.code
    }

    pub fn prev_step(&self) -> Option<PassKind> {
        self.pass.prev
    }

    pub fn src_path(&self) -> &Path {
        &self.src_path
    }

    pub fn obj_path(&self) -> &Path {
        &self.obj_path
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub(crate) fn say(&self, msg: &str) {
        (self.stdout)(msg);
    }

    pub(crate) fn complain(&self, msg: &str) {
        (self.stderr)(msg);
    }

    fn output_artifact(&self, binary: &Path, timestamp: i64, kind: ArtifactKind) -> LogArtifact {
        LogArtifact {
            pass: self.pass.kind,
            binary: binary.to_path_buf(),
            timestamp,
            path: artifact_path(&self.log_dir, binary, self.pass.kind, timestamp, kind),
            kind,
        }
    }

    /// Results of the predecessor pass for `binary`; `None` for an entry pass.
    pub fn input_logfile(&self, binary: &Path) -> PipelineResult<Option<PathBuf>> {
        let Some(prev) = self.pass.prev else {
            return Ok(None);
        };
        match resolve_latest(&self.log_dir, prev, binary)? {
            Some(path) => Ok(Some(path)),
            None => Err(self.report(PipelineError::MissingPredecessor {
                pass: self.pass.kind,
                required: prev,
                binary: binary.display().to_string(),
            })),
        }
    }

    /// This pass's own most recent results for `binary`.
    pub fn latest_results(&self, binary: &Path) -> PipelineResult<PathBuf> {
        resolve_latest(&self.log_dir, self.pass.kind, binary)?.ok_or_else(|| {
            self.report(PipelineError::NoResults {
                pass: self.pass.kind,
                binary: binary.display().to_string(),
            })
        })
    }

    fn report(&self, err: PipelineError) -> PipelineError {
        self.complain(&err.to_string());
        err
    }

    /// Engine invocation:
    /// `<bin> [cli-options] -t <module> -o <results> -logfile <debug> [-i <input>] -- <binary> <args>`.
    pub fn command(
        &self,
        binary: &Path,
        args: &[String],
        results: &Path,
        debug: &Path,
        input: Option<&Path>,
    ) -> Command {
        let mut cmd = Command::new(&self.engine.bin);
        if let Some(opts) = &self.engine.cli_options {
            cmd.args(opts.split_whitespace());
        }
        cmd.arg("-t").arg(&self.obj_path);
        cmd.arg("-o").arg(results);
        cmd.arg("-logfile").arg(debug);
        if let Some(input) = input {
            cmd.arg("-i").arg(input);
        }
        cmd.arg("--").arg(binary);
        cmd.args(args.iter().map(OsString::from));
        cmd
    }

    /// Run the pass on `binary`, blocking until the instrumented process exits.
    pub fn launch(
        &self,
        binary: &Path,
        args: &[String],
        options: LaunchOptions,
    ) -> PipelineResult<LaunchOutcome> {
        if !binary.is_file() {
            return Err(PipelineError::MissingBinary(binary.to_path_buf()));
        }

        let timestamp = Utc::now().timestamp();
        let results = self.output_artifact(binary, timestamp, ArtifactKind::Results);
        let debug = self.output_artifact(binary, timestamp, ArtifactKind::Debug);
        let input = self.input_logfile(binary)?;

        fs::create_dir_all(&self.log_dir).map_err(PipelineError::io(format!(
            "Failed to create log dir {}",
            self.log_dir.display()
        )))?;

        let mut cmd = self.command(binary, args, &results.path, &debug.path, input.as_deref());
        let command = render_command(&cmd);

        let transcript = if options.transcript {
            let artifact = self.output_artifact(binary, timestamp, ArtifactKind::Log);
            let out = fs::File::create(&artifact.path).map_err(PipelineError::io(format!(
                "Failed to create transcript {}",
                artifact.path.display()
            )))?;
            let err = out.try_clone().map_err(PipelineError::io("Failed to share transcript"))?;
            cmd.stdout(Stdio::from(out)).stderr(Stdio::from(err));
            Some(artifact)
        } else {
            None
        };

        if options.verbose {
            self.say(&command);
        }
        log::info!("launching {} inference on {}", self.pass.kind, binary.display());

        let start = Instant::now();
        let status = cmd
            .status()
            .map_err(PipelineError::io(format!("Failed to spawn {}", self.engine.bin.display())))?;
        let duration = start.elapsed();

        // Exit status is recorded, not enforced.
        log::debug!("{} inference on {} exited with {status}", self.pass.kind, binary.display());

        if options.verbose {
            self.say(&format!("Inference results logged in {}", results.path.display()));
            self.say(&format!("Execution time: {:.6}s", duration.as_secs_f64()));
        }

        Ok(LaunchOutcome {
            results,
            debug,
            transcript,
            input,
            command,
            duration,
            exit_code: status.code(),
        })
    }

    /// Parse this pass's latest results for `binary` with the matching evaluator.
    pub fn analysis(&self, binary: &Path) -> PipelineResult<Analysis> {
        let logfile = self.latest_results(binary)?;
        Ok(Analysis::load(self.pass.kind, binary, &logfile)?)
    }
}

impl fmt::Debug for Pintool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pintool")
            .field("pass", &self.pass)
            .field("src_path", &self.src_path)
            .field("obj_path", &self.obj_path)
            .field("engine", &self.engine)
            .field("log_dir", &self.log_dir)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Pintool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pass.kind.as_str())
    }
}
