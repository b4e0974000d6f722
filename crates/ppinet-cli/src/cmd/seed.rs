//! `ppinet seed`: load the curated cancer-gene set into the cache.

use anyhow::Result;
use clap::Args;
use ppinet_core::cache::CommitReport;
use ppinet_core::seed::{CURATED_GENES, seed_curated_genes};

use super::Context;
use crate::output::{kv, render, section};

#[derive(Args, Debug, Default)]
pub struct SeedArgs {}

/// Execute `ppinet seed`. Genes already cached keep their stored
/// classification, so running it twice adds nothing.
pub fn run_seed(_args: &SeedArgs, ctx: &Context) -> Result<()> {
    let mut cache = ctx.open_cache()?;
    let report: CommitReport = seed_curated_genes(&mut cache)?;

    render(ctx.output, &report, |r, w| {
        section(w, "Curated genes seeded")?;
        kv(w, "curated", CURATED_GENES.len().to_string())?;
        kv(w, "added", r.genes_written.to_string())?;
        kv(w, "already cached", r.already_cached.len().to_string())
    })
}
