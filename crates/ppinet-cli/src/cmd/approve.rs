//! `ppinet approve`: commit a review ticket and run the deferred analysis.

use anyhow::{Context as _, Result};
use clap::Args;
use ppinet_analysis::{Explorer, ReviewTicket};
use std::fs;
use std::path::PathBuf;

use super::Context;
use super::analyze::render_analysis;

#[derive(Args, Debug)]
pub struct ApproveArgs {
    /// Review ticket written by `ppinet analyze`.
    #[arg(value_name = "TICKET")]
    pub ticket: PathBuf,
}

pub fn run_approve(args: &ApproveArgs, ctx: &Context) -> Result<()> {
    let text = fs::read_to_string(&args.ticket)
        .with_context(|| format!("read review ticket {}", args.ticket.display()))?;
    let ticket = ReviewTicket::from_json(&text)?;

    let mut cache = ctx.open_cache()?;
    let classifier = ctx.classifier();
    let evidence = ctx.evidence();
    let mut explorer = Explorer::new(&mut cache, classifier.as_ref(), &evidence, &ctx.config);

    let result = explorer.approve(&ticket)?;
    render_analysis(ctx, &result)
}
