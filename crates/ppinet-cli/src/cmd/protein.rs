//! `ppinet protein`: identity and reference links for one protein.

use anyhow::Result;
use clap::Args;
use ppinet_core::PpiError;
use ppinet_core::symbol::normalize_symbol;

use super::Context;
use crate::output::{kv, render, section};

#[derive(Args, Debug)]
pub struct ProteinArgs {
    /// Gene symbol (case-insensitive).
    #[arg(value_name = "GENE")]
    pub gene: String,
}

pub fn run_protein(args: &ProteinArgs, ctx: &Context) -> Result<()> {
    let symbol = normalize_symbol(&args.gene);
    if symbol.is_empty() {
        return Err(PpiError::InvalidInput("gene symbol is empty".to_string()).into());
    }

    let details = ctx.evidence().protein_details(&symbol)?;
    render(ctx.output, &details, |d, w| {
        section(w, &d.gene)?;
        kv(w, "protein", &d.protein_id)?;
        kv(w, "preferred name", &d.preferred_name)?;
        kv(w, "annotation", &d.annotation)?;
        kv(w, "ncbi", &d.ncbi_url)?;
        kv(w, "uniprot", &d.uniprot_url)?;
        kv(w, "string", &d.string_url)
    })
}
