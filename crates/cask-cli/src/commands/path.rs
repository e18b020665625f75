//! `cask path`

use std::io::Write;

use cask_core::CaskResult;

use super::{write_out, CommandContext};

/// One line per candidate of the preferred algorithm, in resolution order
pub fn execute<W: Write>(sri: &str, ctx: &CommandContext, out: &mut W) -> CaskResult<()> {
    for (cpath, _) in ctx.store.candidate_paths(sri)? {
        write_out(out, format!("{}\n", cpath.display()).as_bytes())?;
    }
    Ok(())
}
