use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_config, LoadedConfig};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    // read config first: it supplies the default log level
    let loaded_config = load_config(cli.config.as_ref()).await?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| loaded_config.config.logging.level.clone());
    init_logging(&level, cli.debug, loaded_config.config.logging.json)?;

    info!("Starting Pinmark v{}", env!("CARGO_PKG_VERSION"));
    loaded_config.report();

    let LoadedConfig { config, path, .. } = loaded_config;
    let cli_context = CliContext::new(config, path, cli.output.clone());

    match dispatch(&cli, &cli_context).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
