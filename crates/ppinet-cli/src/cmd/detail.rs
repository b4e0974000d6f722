//! `ppinet detail`: extended clinical detail for one cached gene.

use anyhow::{Context as _, Result};
use clap::Args;
use ppinet_core::symbol::normalize_symbol;
use ppinet_core::{Orchestrator, PpiError};
use std::io::Write;

use super::Context;
use crate::output::render;

#[derive(Args, Debug)]
pub struct DetailArgs {
    /// Gene symbol (case-insensitive). Must already be cached.
    #[arg(value_name = "GENE")]
    pub gene: String,
}

/// Execute `ppinet detail`. The first call per gene goes to the classifier;
/// later calls are served from the cache.
pub fn run_detail(args: &DetailArgs, ctx: &Context) -> Result<()> {
    let symbol = normalize_symbol(&args.gene);
    if symbol.is_empty() {
        return Err(PpiError::InvalidInput("gene symbol is empty".to_string()).into());
    }

    let mut cache = ctx.open_cache()?;
    let classifier = ctx.classifier();
    let orchestrator = Orchestrator::new(classifier.as_ref(), ctx.config.enrichment.max_concurrency);
    let raw = orchestrator.extended_detail(&mut cache, &symbol)?;

    // The stored blob has no fixed schema; show it as JSON either way.
    let detail: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("cached detail for {symbol} is not JSON"))?;
    render(ctx.output, &detail, |d, w| {
        writeln!(w, "{symbol}")?;
        let pretty = serde_json::to_string_pretty(d).map_err(std::io::Error::other)?;
        writeln!(w, "{pretty}")
    })
}
