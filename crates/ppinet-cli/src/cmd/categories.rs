//! `ppinet categories`: list functional categories.

use anyhow::Result;
use clap::Args;
use std::io::Write;

use super::Context;
use crate::output::render;

#[derive(Args, Debug, Default)]
pub struct CategoriesArgs {}

pub fn run_categories(_args: &CategoriesArgs, ctx: &Context) -> Result<()> {
    let categories = ctx.open_cache()?.all_categories()?;

    render(ctx.output, &categories, |cats, w| {
        writeln!(w, "{:>4}  {:<7}  NAME", "ID", "COLOR")?;
        for c in cats {
            writeln!(w, "{:>4}  {:<7}  {}", c.id, c.color, c.name)?;
        }
        Ok(())
    })
}
