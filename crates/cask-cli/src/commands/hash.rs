//! `cask hash`

use std::io::Write;
use std::path::Path;

use cask_core::utils::{compute_file_integrity, parse_algorithm};
use cask_core::CaskResult;

use super::write_out;

pub fn execute<W: Write>(file: &Path, algorithm: &str, out: &mut W) -> CaskResult<()> {
    let algorithm = parse_algorithm(algorithm)?;
    let sri = compute_file_integrity(file, algorithm)?;
    write_out(out, format!("{}\n", sri).as_bytes())
}
