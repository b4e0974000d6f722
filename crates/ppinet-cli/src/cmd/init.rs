//! `ppinet init`: create or migrate the knowledge cache.

use anyhow::Result;
use clap::Args;
use ppinet_core::model::Category;
use serde::Serialize;

use super::Context;
use crate::output::{kv, render, section};

#[derive(Args, Debug, Default)]
pub struct InitArgs {}

#[derive(Debug, Serialize)]
struct InitReport {
    database: String,
    genes_cached: usize,
    categories: Vec<Category>,
}

/// Execute `ppinet init`. Opening the cache runs any pending migrations
/// and seeds the default palette on first use.
pub fn run_init(_args: &InitArgs, ctx: &Context) -> Result<()> {
    let cache = ctx.open_cache()?;
    let report = InitReport {
        database: ctx.db_path.display().to_string(),
        genes_cached: cache.gene_count()?,
        categories: cache.all_categories()?,
    };

    render(ctx.output, &report, |r, w| {
        section(w, "Knowledge cache ready")?;
        kv(w, "database", &r.database)?;
        kv(w, "genes cached", r.genes_cached.to_string())?;
        kv(w, "categories", r.categories.len().to_string())
    })
}
