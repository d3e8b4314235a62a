use std::path::Path;

use crate::model::ArityRecord;
use crate::parser::{numbered_lines, read_log, LineCtx, ParseResult};

/// Parse an arity results file.
///
/// Line format: `<image>:<address>:<name>:<int_reg>:<int_stack>:<float_reg>:<float_stack>:<ret>`.
pub fn parse_arity_log(path: &Path) -> ParseResult<Vec<ArityRecord>> {
    let body = read_log(path)?;
    parse_arity(&body, path)
}

/// Parse arity records from an in-memory log; `path` is only used in errors.
pub fn parse_arity(body: &str, path: &Path) -> ParseResult<Vec<ArityRecord>> {
    numbered_lines(body)
        .map(|(line, text)| {
            let ctx = LineCtx { path, line };
            let f = ctx.fields(text, 8)?;
            Ok(ArityRecord {
                function: ctx.function(f[0], f[1], f[2])?,
                int_reg: ctx.number(f[3], "integer register count")?,
                int_stack: ctx.number(f[4], "integer stack count")?,
                float_reg: ctx.number(f[5], "float register count")?,
                float_stack: ctx.number(f[6], "float stack count")?,
                ret: ctx.number(f[7], "return flag")?,
            })
        })
        .collect()
}
