//! Command implementations and dispatch logic.
//!
//! Each handler takes the shared [`CommandContext`] plus whatever writer its
//! output should go to, so tests can capture it.

use std::collections::HashMap;
use std::io::Write;
use std::process::ExitCode;

use cask_config::{ConfigLayering, ConfigLoader, ResolvedConfig};
use cask_content::ContentStore;
use cask_core::{CaskError, CaskResult};
use tracing::{debug, info};

pub mod cat;
pub mod cp;
pub mod has;
pub mod hash;
pub mod path;


use crate::{output::OutputHandler, Commands, GlobalArgs};

/// Shared context for all commands
pub struct CommandContext {
    pub store: ContentStore,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Load configuration and open the store it names
    pub async fn new(global: &GlobalArgs) -> CaskResult<Self> {
        let loader = ConfigLoader::from_current_dir()?;
        let (file, source) = loader.load(global.config.as_deref()).await?;

        let mut cli_overrides = HashMap::new();
        if let Some(store) = &global.store {
            cli_overrides.insert("store".to_string(), store.to_string());
        }

        let resolved = ConfigLayering::new(file)
            .with_env(ConfigLayering::collect_env_overrides())
            .with_cli(cli_overrides)
            .resolve(source)?;

        debug!(store = %resolved.store_root, source = ?resolved.source, "resolved configuration");
        Ok(Self::from_config(resolved, OutputHandler::new()))
    }

    pub fn from_config(config: ResolvedConfig, output: OutputHandler) -> Self {
        Self {
            store: ContentStore::with_config(config.store_root.as_std_path(), config.content),
            output,
        }
    }
}

/// Run a command, loading configuration only for commands that use the store
pub async fn run(command: Commands, global: &GlobalArgs) -> CaskResult<ExitCode> {
    if let Commands::Hash { file, algorithm } = &command {
        info!("Hashing {}", file.display());
        hash::execute(file, algorithm, &mut std::io::stdout().lock())?;
        return Ok(ExitCode::SUCCESS);
    }

    let ctx = CommandContext::new(global).await?;
    dispatch_command(command, &ctx).await
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> CaskResult<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Cat { sri, size, stream } => {
            info!("Reading {} (stream: {})", sri, stream);
            cat::execute(&sri, size, stream, ctx, &mut out).await?;
        }
        Commands::Cp { sri, dest } => {
            info!("Copying {} to {}", sri, dest.display());
            cp::execute(&sri, &dest, ctx).await?;
        }
        Commands::Has { sri, json } => {
            info!("Checking for {}", sri);
            if !has::execute(&sri, json, ctx, &mut out).await? {
                return Ok(ExitCode::from(1));
            }
        }
        Commands::Path { sri } => path::execute(&sri, ctx, &mut out)?,
        Commands::Hash { file, algorithm } => hash::execute(&file, &algorithm, &mut out)?,
    }

    Ok(ExitCode::SUCCESS)
}

pub(crate) fn write_out<W: Write>(out: &mut W, bytes: &[u8]) -> CaskResult<()> {
    out.write_all(bytes)
        .map_err(|e| CaskError::io("Failed to write output", e))
}

pub(crate) fn flush_out<W: Write>(out: &mut W) -> CaskResult<()> {
    out.flush().map_err(|e| CaskError::io("Failed to write output", e))
}
