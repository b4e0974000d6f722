//! `ppinet drugs`: known drug interactions for one gene.

use anyhow::Result;
use clap::Args;
use ppinet_core::PpiError;
use ppinet_core::symbol::normalize_symbol;
use std::io::Write;

use super::Context;
use crate::output::{kv, render, section};

#[derive(Args, Debug)]
pub struct DrugsArgs {
    /// Gene symbol (case-insensitive).
    #[arg(value_name = "GENE")]
    pub gene: String,
}

/// Execute `ppinet drugs`. An unreachable drug database is reported in
/// the output, not as a failure.
pub fn run_drugs(args: &DrugsArgs, ctx: &Context) -> Result<()> {
    let symbol = normalize_symbol(&args.gene);
    if symbol.is_empty() {
        return Err(PpiError::InvalidInput("gene symbol is empty".to_string()).into());
    }

    let report = ctx.dgidb().drug_report(&symbol);
    render(ctx.output, &report, |r, w| {
        section(w, &r.gene)?;
        kv(w, "druggable", if r.druggable { "yes" } else { "no" })?;
        if let Some(message) = &r.message {
            return writeln!(w, "{message}");
        }
        kv(w, "drugs", r.drug_count.to_string())?;
        if !r.categories.is_empty() {
            kv(w, "interaction types", r.categories.join(", "))?;
        }
        for drug in &r.drugs {
            writeln!(w, "  {:<24}  {}", drug.drug_name, drug.interaction_types.join(", "))?;
        }
        if let Some(url) = &r.dgidb_url {
            kv(w, "dgidb", url)?;
        }
        Ok(())
    })
}
