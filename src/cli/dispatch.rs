use super::attach::cmd_attach;
use super::capture::cmd_capture;
use super::config::cmd_config;
use super::env::CliArgs;
use super::path::cmd_path;
use super::resolve::cmd_resolve;
use super::score::cmd_score;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Capture(args) => cmd_capture(args, ctx).await,
        Commands::Resolve(args) => cmd_resolve(args, ctx).await,
        Commands::Path(args) => cmd_path(args, ctx).await,
        Commands::Score(args) => cmd_score(args, ctx).await,
        Commands::Attach(args) => cmd_attach(args, ctx).await,
        Commands::Config(args) => cmd_config(args, ctx).await,
    }
}
