//! `cask cp`

use std::path::Path;

use cask_core::CaskResult;

use super::CommandContext;

pub async fn execute(sri: &str, dest: &Path, ctx: &CommandContext) -> CaskResult<u64> {
    let bytes = ctx.store.copy(sri, dest).await?;
    ctx.output
        .success(&format!("Copied {} bytes to {}", bytes, dest.display()));
    Ok(bytes)
}
