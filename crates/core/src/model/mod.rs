//! Core data model shared by the pipeline, the log parsers and the evaluators.
//!
//! - `PassKind` / `Pass`: the inference stages and their ordering.
//! - `LogArtifact`: files produced by a pass run.
//! - `FunctionId` and the per-pass records read back from logs.
//! - `Prototype`: a ground-truth signature.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One stage of signature inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    Arity,
    Type,
    Couple,
}

impl PassKind {
    pub const ALL: [PassKind; 3] = [PassKind::Arity, PassKind::Type, PassKind::Couple];

    pub fn as_str(self) -> &'static str {
        match self {
            PassKind::Arity => "arity",
            PassKind::Type => "type",
            PassKind::Couple => "couple",
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arity" => Ok(PassKind::Arity),
            "type" => Ok(PassKind::Type),
            "couple" => Ok(PassKind::Couple),
            other => Err(format!("Unknown pass '{other}'. Allowed: arity, type, couple")),
        }
    }
}

/// A registered pass: its kind, the ordinal code it was registered under and
/// the pass whose results it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pass {
    pub kind: PassKind,
    pub code: usize,
    pub prev: Option<PassKind>,
}

impl Pass {
    /// A pass with no predecessor starts the pipeline.
    pub fn is_entry_point(&self) -> bool {
        self.prev.is_none()
    }
}

/// Kind of file a pass run leaves in the log directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Captured stdout/stderr of the instrumented process.
    Log,
    /// The instrumentation engine's own logfile.
    Debug,
    /// Inference output consumed by the next pass and by the evaluators.
    Results,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Log => "log",
            ArtifactKind::Debug => "dbg",
            ArtifactKind::Results => "results",
        }
    }
}

/// A file produced by running a pass against a binary. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogArtifact {
    pub pass: PassKind,
    pub binary: PathBuf,
    /// Unix seconds embedded in the file name.
    pub timestamp: i64,
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

/// Function identity as written by the instrumentation: `<image>:<address>:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionId {
    pub image: String,
    pub address: u64,
    /// Empty when the symbol could not be resolved.
    pub name: String,
}

impl FunctionId {
    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}@0x{:x}] {}", self.image, self.address, self.name)
    }
}

/// One observed invocation from an arity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArityRecord {
    pub function: FunctionId,
    pub int_reg: u32,
    pub int_stack: u32,
    pub float_reg: u32,
    pub float_stack: u32,
    /// Nonzero when a return value was observed.
    pub ret: u32,
}

impl ArityRecord {
    /// Total observed arguments, summed wide enough for any four `u32` counts.
    pub fn arity(&self) -> u64 {
        [self.int_reg, self.int_stack, self.float_reg, self.float_stack]
            .into_iter()
            .map(u64::from)
            .sum()
    }

    pub fn returns_value(&self) -> bool {
        self.ret != 0
    }
}

/// Coarse value class used by the type pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Int,
    Float,
    Addr,
    Void,
    Undef,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Int => "INT",
            TypeKind::Float => "FLOAT",
            TypeKind::Addr => "ADDR",
            TypeKind::Void => "VOID",
            TypeKind::Undef => "UNDEF",
        }
    }

    /// Classify a C type name from a ground-truth prototype.
    pub fn from_c_type(ty: &str) -> TypeKind {
        let ty = ty.trim();
        if ty == "void" {
            TypeKind::Void
        } else if ty.contains('*') || ty.contains("[]") {
            TypeKind::Addr
        } else if matches!(ty, "float" | "double" | "long double") {
            TypeKind::Float
        } else {
            TypeKind::Int
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INT" => Ok(TypeKind::Int),
            "FLOAT" => Ok(TypeKind::Float),
            "ADDR" => Ok(TypeKind::Addr),
            "VOID" => Ok(TypeKind::Void),
            "UNDEF" => Ok(TypeKind::Undef),
            other => Err(format!("unknown type kind '{other}'")),
        }
    }
}

/// One function's inferred types from a type log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRecord {
    pub function: FunctionId,
    pub ret: TypeKind,
    pub params: Vec<TypeKind>,
}

/// Observed data flow from `producer`'s return value into parameter `param`
/// (0-based) of `consumer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoupleRecord {
    pub producer: FunctionId,
    pub consumer: FunctionId,
    pub param: usize,
}

/// Ground-truth signature: return kind first, then parameters in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prototype(pub Vec<String>);

impl Prototype {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn ret(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("void")
    }

    pub fn params(&self) -> &[String] {
        self.0.get(1..).unwrap_or(&[])
    }

    pub fn returns_value(&self) -> bool {
        self.ret() != "void"
    }

    /// Render as `name (p1, p2) -> ret`.
    pub fn render(&self, name: &str) -> String {
        format!("{} ({}) -> {}", name, self.params().join(", "), self.ret())
    }
}
