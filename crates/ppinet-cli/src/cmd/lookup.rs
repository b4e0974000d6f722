//! `ppinet lookup`: show cached gene metadata.

use anyhow::Result;
use clap::Args;
use ppinet_core::model::Gene;
use ppinet_core::symbol::normalize_gene_list;
use serde::Serialize;
use std::io::Write;

use super::Context;
use crate::output::render;

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Gene symbols (case-insensitive).
    #[arg(required = true, value_name = "GENES")]
    pub genes: Vec<String>,
}

#[derive(Debug, Serialize)]
struct LookupReport {
    found: Vec<Gene>,
    not_found: Vec<String>,
}

pub fn run_lookup(args: &LookupArgs, ctx: &Context) -> Result<()> {
    let symbols = normalize_gene_list(&args.genes);
    let mut hits = ctx.open_cache()?.lookup_genes(&symbols)?;

    // Report in request order.
    let mut report = LookupReport {
        found: Vec::new(),
        not_found: Vec::new(),
    };
    for symbol in symbols {
        match hits.remove(&symbol) {
            Some(gene) => report.found.push(gene),
            None => report.not_found.push(symbol),
        }
    }

    render(ctx.output, &report, |r, w| {
        for gene in &r.found {
            writeln!(w, "{:<10} {:<22} {}", gene.symbol, gene.category, gene.description)?;
        }
        if !r.not_found.is_empty() {
            writeln!(w, "not cached: {}", r.not_found.join(", "))?;
        }
        Ok(())
    })
}
