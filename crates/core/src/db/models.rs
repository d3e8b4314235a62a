use serde::{Deserialize, Serialize};

/// One instrumented run, as recorded in the `launches` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchRecord {
    pub pass: String,
    pub binary: String,
    /// SHA-256 of the binary at launch time, when computed.
    pub binary_hash: Option<String>,
    pub results_path: String,
    pub debug_path: String,
    pub input_path: Option<String>,
    /// Exit code of the instrumented process; informational only.
    pub exit_code: Option<i32>,
    pub duration_ms: i64,
    pub started_at: String,
}

/// One module build, as recorded in the `builds` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildRecord {
    pub pass: String,
    pub variant: String,
    pub outcome: String,
    pub finished_at: String,
}
