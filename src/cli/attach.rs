use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use element_locator::attach_fingerprints;
use pinmark_core_types::parse_records;
use serde::Serialize;
use tokio::fs;
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::emit;
use crate::page::load_document;

#[derive(Args, Clone, Debug)]
pub struct AttachArgs {
    /// HTML snapshot of the page the records were made on
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// Review records (JSON array)
    #[arg(long, value_name = "FILE")]
    pub records: PathBuf,

    /// Save the updated records back to the records file
    #[arg(long)]
    pub write: bool,
}

#[derive(Debug, Serialize)]
struct AttachSummary {
    total: usize,
    updated: usize,
    written: bool,
}

pub async fn cmd_attach(args: AttachArgs, ctx: &CliContext) -> Result<()> {
    let doc = load_document(&args.html).await?;
    let raw = fs::read_to_string(&args.records)
        .await
        .with_context(|| format!("reading {}", args.records.display()))?;
    let mut records = parse_records(&raw)
        .with_context(|| format!("parsing {}", args.records.display()))?;

    let updated = attach_fingerprints(&mut records, &doc);

    if !args.write {
        return emit(&ctx.output(), &records, |records| {
            serde_json::to_string_pretty(records).unwrap_or_default()
        });
    }

    if updated > 0 {
        let serialized = serde_json::to_string_pretty(&records)?;
        fs::write(&args.records, serialized)
            .await
            .with_context(|| format!("writing {}", args.records.display()))?;
        info!(path = %args.records.display(), updated, "Saved review records");
    }

    let summary = AttachSummary {
        total: records.len(),
        updated,
        written: updated > 0,
    };
    emit(&ctx.output(), &summary, |summary| {
        format!(
            "Attached {} of {} record(s){}",
            summary.updated,
            summary.total,
            if summary.written { "" } else { "; nothing to save" }
        )
    })
}
