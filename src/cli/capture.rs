use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use element_fingerprint::capture;
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::emit;
use crate::page::{load_document, select_element};

#[derive(Args, Clone, Debug)]
pub struct CaptureArgs {
    /// HTML snapshot of the page
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// CSS selector of the element to capture
    #[arg(long)]
    pub selector: String,

    /// Which match of the selector to capture (0-based)
    #[arg(long, default_value_t = 0)]
    pub index: usize,
}

pub async fn cmd_capture(args: CaptureArgs, ctx: &CliContext) -> Result<()> {
    let doc = load_document(&args.html).await?;
    let node = select_element(&doc, &args.selector, args.index)?;
    let fingerprint = capture(&doc, node)
        .with_context(|| format!("{node} is not an element"))?;
    info!(node = %node, tag = fingerprint.tag_name(), "Captured fingerprint");

    // human output is the storage form, ready to paste into `resolve`
    emit(&ctx.output(), &fingerprint, |fp| fp.to_json())
}
