//! `ppinet analyze`: enrich, fetch, and analyze a gene list.

use anyhow::{Context as _, Result};
use clap::Args;
use ppinet_analysis::{AnalysisResult, Exploration, Explorer, ReviewTicket};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use super::Context;
use crate::output::{kv, render, section};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Gene symbols (case-insensitive, duplicates ignored).
    #[arg(required = true, value_name = "GENES")]
    pub genes: Vec<String>,

    /// Minimum interaction confidence in [0, 1] (default from config).
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Where to write the review ticket when new categories are proposed.
    #[arg(long, value_name = "PATH", default_value = "ppinet-review.json")]
    pub ticket_out: PathBuf,
}

#[derive(Debug, Serialize)]
struct ReviewNotice<'a> {
    status: &'static str,
    ticket: String,
    new_categories: &'a [String],
    pending_genes: usize,
}

/// Execute `ppinet analyze`.
///
/// A category review is a normal outcome: the ticket is written to disk and
/// the command succeeds without analyzing.
pub fn run_analyze(args: &AnalyzeArgs, ctx: &Context) -> Result<()> {
    let confidence = args
        .confidence
        .unwrap_or(ctx.config.evidence.default_confidence);

    let mut cache = ctx.open_cache()?;
    let classifier = ctx.classifier();
    let evidence = ctx.evidence();
    let mut explorer = Explorer::new(&mut cache, classifier.as_ref(), &evidence, &ctx.config);

    match explorer.explore(&args.genes, confidence)? {
        Exploration::Analyzed(result) => render_analysis(ctx, &result),
        Exploration::ReviewRequired(ticket) => {
            write_ticket(&ticket, &args.ticket_out)?;
            let notice = ReviewNotice {
                status: "review_required",
                ticket: args.ticket_out.display().to_string(),
                new_categories: &ticket.new_categories,
                pending_genes: ticket.pending_genes.len(),
            };
            render(ctx.output, &notice, |n, w| {
                writeln!(
                    w,
                    "{} new categor{} proposed: {}",
                    n.new_categories.len(),
                    if n.new_categories.len() == 1 { "y" } else { "ies" },
                    n.new_categories.join(", ")
                )?;
                writeln!(w, "Review ticket written to {}", n.ticket)?;
                writeln!(
                    w,
                    "Remove any category you reject from the ticket, then run `ppinet approve {}`.",
                    n.ticket
                )
            })
        }
    }
}

fn write_ticket(ticket: &ReviewTicket, path: &Path) -> Result<()> {
    let text = ticket.to_json_pretty()?;
    fs::write(path, text).with_context(|| format!("write review ticket to {}", path.display()))?;
    info!(path = %path.display(), "review ticket written");
    Ok(())
}

/// Render an analysis in the active output mode. Shared with `approve`.
pub fn render_analysis(ctx: &Context, result: &AnalysisResult) -> Result<()> {
    render(ctx.output, result, write_summary)
}

fn write_summary(result: &AnalysisResult, w: &mut dyn Write) -> io::Result<()> {
    let stats = &result.stats;
    section(w, "Network")?;
    kv(w, "proteins", stats.total_nodes.to_string())?;
    kv(w, "interactions", stats.total_edges.to_string())?;
    kv(w, "modules", stats.modules_detected.to_string())?;
    kv(w, "genes found", result.genes_found.join(", "))?;
    if !result.genes_not_found.is_empty() {
        kv(w, "genes not found", result.genes_not_found.join(", "))?;
    }

    if !stats.top_hubs.is_empty() {
        writeln!(w)?;
        section(w, "Top hubs")?;
        for hub in &stats.top_hubs {
            writeln!(w, "{:<12} degree {:>3}  centrality {:.4}", hub.gene, hub.degree, hub.centrality)?;
        }
    }

    if !stats.top_bottlenecks.is_empty() {
        writeln!(w)?;
        section(w, "Top bottlenecks")?;
        for b in &stats.top_bottlenecks {
            writeln!(w, "{:<12} betweenness {:.4}", b.gene, b.betweenness)?;
        }
    }

    if !result.nodes.is_empty() {
        writeln!(w)?;
        section(w, "Proteins")?;
        for node in &result.nodes {
            writeln!(
                w,
                "{:<12} module {:>2}  degree {:.4}  betweenness {:.4}  {}",
                node.id, node.module, node.degree, node.betweenness, node.category
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppinet_analysis::analyze;
    use ppinet_core::{InteractionRecord, KnowledgeCache};

    #[test]
    fn summary_lists_hubs_and_missing_genes() {
        let cache = KnowledgeCache::in_memory().expect("cache");
        let records = vec![
            InteractionRecord::new("TP53", "MDM2", 0.9),
            InteractionRecord::new("TP53", "ATM", 0.8),
        ];
        let result = analyze(&records, &["TP53", "BRCA1"], &cache).expect("analyze");

        let mut buf = Vec::new();
        write_summary(&result, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("proteins:          3"));
        assert!(text.contains("genes not found:   BRCA1"));
        assert!(text.contains("Top hubs"));
        assert!(text.lines().any(|l| l.starts_with("TP53") && l.contains("degree   2")));
    }

    #[test]
    fn empty_network_prints_counts_only() {
        let cache = KnowledgeCache::in_memory().expect("cache");
        let result = analyze(&[], &["TP53"], &cache).expect("analyze");

        let mut buf = Vec::new();
        write_summary(&result, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("interactions:      0"));
        assert!(!text.contains("Top hubs"));
    }
}
