use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;
use protoscope::commands::{
    accuracy_command, build_command, chart_command, display_command, init_project_command,
    launch_command, mismatch_command, project_info_command, runs_command, LaunchFlags,
};
use protoscope_core::pipeline::BuildOptions;

/// Orchestrates signature-inference passes and evaluates their results.
///
/// This CLI is a thin wrapper around `protoscope-core`; all substantive logic
/// lives in the library.
#[derive(Parser, Debug)]
#[command(
    name = "protoscope",
    version,
    about = "Signature-inference pass orchestrator and evaluator",
    long_about = None
)]
struct Cli {
    /// Log debug details (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new project at the given root.
    ///
    /// Writes `.protoscope/project.json` with the default arity > type > couple
    /// chain, creates the logs directory and the project database.
    InitProject {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,

        /// Instrumentation engine launcher.
        #[arg(long)]
        engine_bin: Option<PathBuf>,

        /// Instrumentation engine root (PIN_ROOT for builds).
        #[arg(long)]
        engine_path: Option<PathBuf>,
    },

    /// Show basic information about an existing project.
    ProjectInfo {
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },

    /// Compile instrumentation modules (all passes unless --pass is given).
    Build {
        #[arg(long, default_value = ".")]
        root: String,

        /// Pass to build; may be repeated.
        #[arg(long = "pass")]
        passes: Vec<String>,

        /// Rebuild even if the build tool considers the module up to date.
        #[arg(long)]
        force: bool,

        #[arg(long)]
        debug: bool,

        #[arg(long)]
        trace: bool,
    },

    /// Run one pass on a binary and record the run.
    Launch {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        pass: String,

        /// Use the module already at obj_path.
        #[arg(long)]
        no_build: bool,

        /// Do not print the command line and timing.
        #[arg(long)]
        quiet: bool,

        /// Capture the program's stdout/stderr in a .log artifact.
        #[arg(long)]
        transcript: bool,

        /// Program to instrument.
        binary: String,

        /// Arguments passed to the program.
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Score the latest results of a pass against the prototype database.
    Accuracy {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        pass: String,

        binary: String,

        #[arg(long)]
        json: bool,
    },

    /// List functions whose inferred signature disagrees with the prototype database.
    Mismatch {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        pass: String,

        binary: String,

        #[arg(long)]
        json: bool,
    },

    /// Print the latest results of a pass, one line per function.
    Display {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        pass: String,

        binary: String,
    },

    /// List recorded launches and builds.
    Runs {
        #[arg(long, default_value = ".")]
        root: String,

        /// Only show this pass.
        #[arg(long)]
        pass: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Summarize an arity threshold-sweep file.
    Chart {
        file: String,

        /// Order by min_calls, param_threshold or ret_threshold.
        #[arg(long)]
        sort_by: Option<String>,

        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter(None, level)
        .parse_env("RUST_LOG")
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::InitProject { root, name, engine_bin, engine_path } => {
            init_project_command(&root, name, engine_bin, engine_path)?
        }
        Command::ProjectInfo { root, json } => project_info_command(&root, json)?,
        Command::Build { root, passes, force, debug, trace } => {
            build_command(&root, &passes, BuildOptions { force, debug, trace })?
        }
        Command::Launch { root, pass, no_build, quiet, transcript, binary, args } => {
            launch_command(&root, &pass, &binary, &args, LaunchFlags { no_build, quiet, transcript })?
        }
        Command::Accuracy { root, pass, binary, json } => {
            accuracy_command(&root, &pass, &binary, json)?
        }
        Command::Mismatch { root, pass, binary, json } => {
            mismatch_command(&root, &pass, &binary, json)?
        }
        Command::Display { root, pass, binary } => display_command(&root, &pass, &binary)?,
        Command::Runs { root, pass, json } => runs_command(&root, pass.as_deref(), json)?,
        Command::Chart { file, sort_by, json } => chart_command(&file, sort_by.as_deref(), json)?,
    }

    Ok(())
}
