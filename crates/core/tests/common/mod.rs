#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use protoscope_core::pipeline::{EngineConfig, Pipeline, PintoolConfig};

/// Engine stand-in run as `/bin/sh <script> ...`: writes one arity line to the
/// `-o` file and the `-i` input path to the `-logfile` file.
pub const FAKE_ENGINE: &str = r#"
out=""; dbg=""; inp=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    -logfile) dbg="$2"; shift ;;
    -i) inp="$2"; shift ;;
    --) break ;;
  esac
  shift
done
echo "input=$inp" > "$dbg"
echo "/bin/true:4096:main:2:0:0:0:1" > "$out"
echo "engine ran"
exit 3
"#;

pub fn touch_with_mtime(path: &Path, secs: u64) {
    fs::write(path, b"").unwrap();
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs)).unwrap();
}

/// An engine config that runs `FAKE_ENGINE` through `/bin/sh`.
pub fn fake_engine(dir: &Path) -> EngineConfig {
    let script = dir.join("fake_engine.sh");
    fs::write(&script, FAKE_ENGINE).unwrap();
    EngineConfig {
        bin: PathBuf::from("/bin/sh"),
        path: dir.join("pin"),
        cli_options: Some(script.display().to_string()),
        compile_flags: None,
        compile_flags_var: None,
        make: None,
    }
}

/// Engine settings that are never executed.
pub fn inert_engine() -> EngineConfig {
    EngineConfig { bin: "pin".into(), path: "/opt/pin".into(), ..Default::default() }
}

/// arity > type > couple over `log_dir`.
pub fn chain(dir: &Path, engine: EngineConfig, log_dir: &Path) -> Pipeline {
    let cfg = |name: &str| {
        PintoolConfig::new(
            name,
            dir.join(format!("src/{name}.cpp")),
            dir.join(format!("obj/{name}.so")),
            engine.clone(),
            log_dir,
        )
    };
    Pipeline::new(vec![
        cfg("arity"),
        cfg("type").with_prev_step("arity"),
        cfg("couple").with_prev_step("type"),
    ])
    .expect("pipeline")
}
