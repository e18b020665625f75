//! `cask cat`

use std::io::Write;

use cask_core::{CaskResult, ReadOpts};
use futures::StreamExt;

use super::{flush_out, write_out, CommandContext};

/// Write verified content to `out`. In stream mode bytes are written as they
/// arrive, so a failed check can leave partial output behind.
pub async fn execute<W: Write>(
    sri: &str,
    size: Option<u64>,
    stream: bool,
    ctx: &CommandContext,
    out: &mut W,
) -> CaskResult<()> {
    let opts = match size {
        Some(size) => ReadOpts::new().size(size),
        None => ReadOpts::new(),
    };

    if stream {
        let mut chunks = ctx.store.read_stream(sri, &opts);
        while let Some(chunk) = chunks.next().await {
            write_out(out, &chunk?)?;
        }
    } else {
        let data = ctx.store.read(sri, &opts).await?;
        write_out(out, &data)?;
    }

    flush_out(out)
}
