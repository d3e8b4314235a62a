use std::path::Path;

use crate::model::CoupleRecord;
use crate::parser::{numbered_lines, read_log, LineCtx, ParseResult};

/// Parse a couple results file.
///
/// Line format: `<image>:<address>:<name>:<param>:<image>:<address>:<name>`,
/// producer first, consumer second.
pub fn parse_couple_log(path: &Path) -> ParseResult<Vec<CoupleRecord>> {
    let body = read_log(path)?;
    parse_couple(&body, path)
}

pub fn parse_couple(body: &str, path: &Path) -> ParseResult<Vec<CoupleRecord>> {
    numbered_lines(body)
        .map(|(line, text)| {
            let ctx = LineCtx { path, line };
            let f = ctx.fields(text, 7)?;
            Ok(CoupleRecord {
                producer: ctx.function(f[0], f[1], f[2])?,
                param: ctx.number(f[3], "parameter index")?,
                consumer: ctx.function(f[4], f[5], f[6])?,
            })
        })
        .collect()
}
