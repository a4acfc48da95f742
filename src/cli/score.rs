use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use element_fingerprint::capture_path;
use element_locator::{decode_fingerprint, score, validate};
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::output::emit;
use crate::page::{load_document, read_fingerprint};

#[derive(Args, Clone, Debug)]
pub struct ScoreArgs {
    /// HTML snapshot of the page
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// Candidate elements to score
    #[arg(long)]
    pub selector: String,

    /// Stored fingerprint (JSON)
    #[arg(long, conflicts_with = "fingerprint_file")]
    pub fingerprint: Option<String>,

    /// File holding the stored fingerprint
    #[arg(long, value_name = "FILE")]
    pub fingerprint_file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ScoredCandidate {
    pub path: String,
    pub tag: String,
    pub score: i64,
    pub valid: bool,
}

pub async fn cmd_score(args: ScoreArgs, ctx: &CliContext) -> Result<()> {
    let doc = load_document(&args.html).await?;
    let payload = read_fingerprint(args.fingerprint, args.fingerprint_file.as_ref()).await?;
    let fingerprint = decode_fingerprint(&payload).context("decoding stored fingerprint")?;

    let candidates: Vec<ScoredCandidate> = doc
        .query_selector_all(&args.selector)
        .with_context(|| format!("invalid selector '{}'", args.selector))?
        .into_iter()
        .filter_map(|node| doc.element(node))
        .map(|el| ScoredCandidate {
            path: capture_path(&doc, el.node_id()),
            tag: el.tag_name().to_string(),
            score: score(&el, &fingerprint),
            valid: validate(&el, &fingerprint),
        })
        .collect();

    emit(&ctx.output(), &candidates, |candidates| {
        if candidates.is_empty() {
            return format!("No element matches '{}'", args.selector);
        }
        candidates
            .iter()
            .map(|c| {
                let mark = if c.valid { "*" } else { " " };
                format!("{:>4} {mark} {}  <{}>", c.score, c.path, c.tag)
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}
