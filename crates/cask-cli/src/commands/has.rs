//! `cask has`

use std::io::Write;

use cask_core::{CaskError, CaskResult};
use serde::Serialize;

use super::{write_out, CommandContext};

#[derive(Debug, Serialize)]
struct HasReport<'a> {
    sri: &'a str,
    present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    found: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
}

/// Report presence of `sri`; returns whether it was found
pub async fn execute<W: Write>(
    sri: &str,
    json: bool,
    ctx: &CommandContext,
    out: &mut W,
) -> CaskResult<bool> {
    let info = ctx.store.has_content(sri).await?;
    let present = info.is_some();

    if json {
        let report = HasReport {
            sri,
            present,
            found: info.as_ref().map(|info| info.sri.to_string()),
            size: info.as_ref().map(|info| info.size),
        };
        let mut line = serde_json::to_string(&report)
            .map_err(|e| CaskError::io("Failed to encode report", e.into()))?;
        line.push('\n');
        write_out(out, line.as_bytes())?;
    } else if let Some(info) = &info {
        write_out(out, format!("{} {}\n", info.sri, info.size).as_bytes())?;
    } else {
        ctx.output.warn(&format!("{} is not in the store", sri));
    }

    Ok(present)
}
