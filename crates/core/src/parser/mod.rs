//! Parsers for the per-pass result logs.
//!
//! Every parser is eager and keeps file order. A malformed line aborts the
//! whole parse.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::FunctionId;

pub mod arity;
pub mod couple;
pub mod types;

pub use arity::{parse_arity, parse_arity_log};
pub use couple::{parse_couple, parse_couple_log};
pub use types::{parse_type, parse_type_log};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: {message}")]
    Malformed { path: PathBuf, line: usize, message: String },
}

pub type ParseResult<T> = Result<T, ParseError>;

pub(crate) fn read_log(path: &Path) -> ParseResult<String> {
    std::fs::read_to_string(path).map_err(|source| ParseError::Io { path: path.to_path_buf(), source })
}

/// Iterate over non-blank lines with 1-based line numbers.
pub(crate) fn numbered_lines(body: &str) -> impl Iterator<Item = (usize, &str)> {
    body.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Position of a line in a log, used to build `ParseError::Malformed`.
pub(crate) struct LineCtx<'a> {
    pub path: &'a Path,
    pub line: usize,
}

impl LineCtx<'_> {
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Malformed {
            path: self.path.to_path_buf(),
            line: self.line,
            message: message.into(),
        }
    }

    /// Split on `:` and require an exact field count.
    pub fn fields<'l>(&self, line: &'l str, expected: usize) -> ParseResult<Vec<&'l str>> {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() != expected {
            return Err(self.error(format!(
                "expected {expected} ':'-separated fields, found {}",
                fields.len()
            )));
        }
        Ok(fields)
    }

    pub fn number<T: std::str::FromStr>(&self, field: &str, what: &str) -> ParseResult<T> {
        field.trim().parse::<T>().map_err(|_| self.error(format!("invalid {what} '{field}'")))
    }

    /// Build a `FunctionId` from `image`, `address`, `name` fields.
    pub fn function(&self, image: &str, address: &str, name: &str) -> ParseResult<FunctionId> {
        Ok(FunctionId {
            image: image.to_string(),
            address: self.number(address, "address")?,
            name: name.to_string(),
        })
    }
}
