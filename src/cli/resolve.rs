use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use dom_snapshot::Document;
use element_fingerprint::{capture_path, ElementFingerprint};
use element_locator::{decode_fingerprint, tier_for, LocatorTier, Resolution};
use overlay_session::{OverlaySession, TracingRenderer};
use serde::Serialize;
use tracing::warn;

use crate::cli::context::CliContext;
use crate::cli::output::emit;
use crate::page::{load_document, read_fingerprint};

#[derive(Args, Clone, Debug)]
pub struct ResolveArgs {
    /// HTML snapshot of the page
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// Stored fingerprint (JSON)
    #[arg(long, conflicts_with = "fingerprint_file")]
    pub fingerprint: Option<String>,

    /// File holding the stored fingerprint
    #[arg(long, value_name = "FILE")]
    pub fingerprint_file: Option<PathBuf>,

    /// Run every configured tier on its own and report each outcome
    #[arg(long)]
    pub explain: bool,
}

#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<LocatorTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tiers: Vec<TierOutcome>,
}

#[derive(Debug, Serialize)]
pub struct TierOutcome {
    pub tier: LocatorTier,
    pub validated: bool,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolveReport {
    fn not_found() -> Self {
        Self {
            found: false,
            tier: None,
            score: None,
            path: None,
            tag: None,
            id: None,
            tiers: Vec::new(),
        }
    }

    fn found(doc: &Document, resolution: Resolution) -> Self {
        let element = doc.element(resolution.node);
        Self {
            found: true,
            tier: Some(resolution.tier),
            score: resolution.score,
            path: Some(capture_path(doc, resolution.node)),
            tag: element.map(|el| el.tag_name().to_string()),
            id: element.and_then(|el| el.id()).map(str::to_string),
            tiers: Vec::new(),
        }
    }

    fn render(&self) -> String {
        let mut out = match (&self.tier, &self.path) {
            (Some(tier), Some(path)) if self.found => {
                let tag = self.tag.as_deref().unwrap_or("?");
                let mut line = format!("Found <{tag}> via {tier} tier");
                if let Some(score) = self.score {
                    line.push_str(&format!(" (score {score})"));
                }
                format!("{line}\n  path: {path}")
            }
            _ => "Element not found".to_string(),
        };
        for outcome in &self.tiers {
            out.push_str(&format!("\n  {:<18} {}", outcome.tier.name(), outcome.outcome));
            if let Some(path) = &outcome.path {
                out.push_str(&format!("  {path}"));
            }
            if let Some(score) = outcome.score {
                out.push_str(&format!(" (score {score})"));
            }
            if outcome.path.is_some() && !outcome.validated {
                out.push_str(" [unvalidated]");
            }
            if let Some(error) = &outcome.error {
                out.push_str(&format!("  {error}"));
            }
        }
        out
    }
}

pub async fn cmd_resolve(args: ResolveArgs, ctx: &CliContext) -> Result<()> {
    let doc = load_document(&args.html).await?;
    let payload = read_fingerprint(args.fingerprint, args.fingerprint_file.as_ref()).await?;

    // an undecodable payload is reported as "not found", never as a failure
    let fingerprint = match decode_fingerprint(&payload) {
        Ok(fingerprint) => fingerprint,
        Err(e) => {
            warn!("Failed to decode stored fingerprint: {}", e);
            return emit(&ctx.output(), &ResolveReport::not_found(), ResolveReport::render);
        }
    };

    let resolver = ctx.resolver();
    let resolution = resolver.resolve_detailed(&fingerprint, &doc);
    let mut report = match resolution {
        Some(resolution) => ResolveReport::found(&doc, resolution),
        None => ResolveReport::not_found(),
    };
    if args.explain {
        report.tiers = explain(&resolver.chain(), &fingerprint, &doc);
    }

    let mut overlay = OverlaySession::new(TracingRenderer::new());
    overlay.update(&doc, resolution.map(|resolution| resolution.node));

    emit(&ctx.output(), &report, ResolveReport::render)
}

fn explain(
    chain: &[LocatorTier],
    fingerprint: &ElementFingerprint,
    doc: &Document,
) -> Vec<TierOutcome> {
    chain
        .iter()
        .map(|&tier| {
            let mut outcome = TierOutcome {
                tier,
                validated: tier.validates(),
                outcome: "no candidate",
                path: None,
                score: None,
                error: None,
            };
            match tier_for(tier).try_resolve(fingerprint, doc) {
                Ok(Some(resolution)) => {
                    outcome.outcome = "matched";
                    outcome.path = Some(capture_path(doc, resolution.node));
                    outcome.score = resolution.score;
                }
                Ok(None) => {}
                Err(e) => {
                    outcome.outcome = "error";
                    outcome.error = Some(e.to_string());
                }
            }
            outcome
        })
        .collect()
}
