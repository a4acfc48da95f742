use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use element_fingerprint::capture_path;

use crate::cli::context::CliContext;
use crate::cli::output::emit;
use crate::page::{load_document, select_element};

#[derive(Args, Clone, Debug)]
pub struct PathArgs {
    /// HTML snapshot of the page
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// CSS selector of the element
    #[arg(long)]
    pub selector: String,

    /// Which match of the selector to use (0-based)
    #[arg(long, default_value_t = 0)]
    pub index: usize,
}

pub async fn cmd_path(args: PathArgs, ctx: &CliContext) -> Result<()> {
    let doc = load_document(&args.html).await?;
    let node = select_element(&doc, &args.selector, args.index)?;
    let path = capture_path(&doc, node);
    emit(&ctx.output(), &path, |path| path.clone())
}
