//! `ldr init` — create (or migrate) the inventory store.

use super::CmdContext;
use crate::output::render_success;
use anyhow::Result;
use clap::Args;
use larder_core::db::migrations;

#[derive(Args, Debug)]
pub struct InitArgs {}

pub fn run_init(_args: &InitArgs, ctx: &CmdContext) -> Result<()> {
    let conn = ctx.create_store()?;
    let version = migrations::current_schema_version(&conn)?;
    render_success(
        ctx.output,
        &format!(
            "Inventory store ready at {} (schema v{version})",
            ctx.db_path.display()
        ),
    )
}
