use std::path::Path;

use crate::model::{TypeKind, TypeRecord};
use crate::parser::{numbered_lines, read_log, LineCtx, ParseResult};

/// Parse a type results file.
///
/// Line format: `<image>:<address>:<name>:<ret-kind>:<kind>,<kind>,...`; the
/// parameter list may be empty.
pub fn parse_type_log(path: &Path) -> ParseResult<Vec<TypeRecord>> {
    let body = read_log(path)?;
    parse_type(&body, path)
}

pub fn parse_type(body: &str, path: &Path) -> ParseResult<Vec<TypeRecord>> {
    numbered_lines(body)
        .map(|(line, text)| {
            let ctx = LineCtx { path, line };
            let f = ctx.fields(text, 5)?;
            let kind = |s: &str| s.trim().parse::<TypeKind>().map_err(|e| ctx.error(e));
            let ret = kind(f[3])?;
            let params = if f[4].trim().is_empty() {
                Vec::new()
            } else {
                f[4].split(',').map(kind).collect::<ParseResult<Vec<_>>>()?
            };
            Ok(TypeRecord { function: ctx.function(f[0], f[1], f[2])?, ret, params })
        })
        .collect()
}
