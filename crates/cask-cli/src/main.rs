//! # cask-cli
//!
//! Command-line access to a content-addressable store.
//!
//! Parses arguments, sets up logging, layers configuration, then dispatches
//! to the command handlers. Exit status is 0 on success, 1 when `has` finds
//! nothing and 2 on any error.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use cask_core::{CaskError, CaskResult};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use output::errors::ErrorFormatter;

/// Read integrity-verified content out of a cask store
#[derive(Parser)]
#[command(name = "cask", version, about = "Integrity-verified content store reads")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Store root directory
    #[arg(long, global = true, value_name = "DIR")]
    pub store: Option<Utf8PathBuf>,

    /// Configuration file to use instead of searching for cask.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write verified content to stdout
    Cat {
        sri: String,
        /// Expected size in bytes
        #[arg(long)]
        size: Option<u64>,
        /// Stream in chunks instead of buffering the whole entry
        #[arg(long)]
        stream: bool,
    },
    /// Copy content out of the store
    Cp { sri: String, dest: std::path::PathBuf },
    /// Report whether content is present
    Has {
        sri: String,
        #[arg(long)]
        json: bool,
    },
    /// Print candidate content paths
    Path { sri: String },
    /// Compute the integrity descriptor of a file
    Hash {
        file: std::path::PathBuf,
        #[arg(long, default_value = "sha512")]
        algorithm: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.global.verbose);
    setup_panic_handler();

    debug!("Starting cask v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(code) => code,
        Err(err) => {
            eprint!("{}", ErrorFormatter::new().format_error(&err));
            ExitCode::from(2)
        }
    }
}

fn run_cli(cli: Cli) -> CaskResult<ExitCode> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CaskError::io("Failed to create async runtime", e))?;

    rt.block_on(commands::run(cli.command, &cli.global))
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "cask={level},cask_core={level},cask_config={level},cask_content={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("cask encountered an unexpected error: {}", panic_info);
        eprintln!("cask crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/cask-store/cask/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
