//! `ldr categories` — list the category taxonomy.

use super::CmdContext;
use crate::output::render;
use anyhow::Result;
use clap::Args;
use larder_core::db::categories;
use std::io::Write as _;

#[derive(Args, Debug)]
pub struct CategoriesArgs {}

pub fn run_categories(_args: &CategoriesArgs, ctx: &CmdContext) -> Result<()> {
    let conn = ctx.open_existing_store()?;
    let listed = categories::list_all(&conn)?;

    render(ctx.output, &listed, |listed, w| {
        if listed.is_empty() {
            return writeln!(w, "No categories yet; they appear as items are added.");
        }
        for category in listed {
            writeln!(w, "#{:<5} {}", category.category_id, category.path())?;
        }
        Ok(())
    })
}
