//! `ldr rm` — bulk-delete items by id, scoped to the acting account.

use super::{CmdContext, resolve_account};
use crate::output::render;
use anyhow::Result;
use clap::Args;
use larder_core::db::items;
use larder_core::error::{ErrorCode, LarderError};
use std::io::Write as _;

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Acting account (defaults to $LARDER_USER).
    #[arg(long)]
    pub user: Option<String>,

    /// Item ids to delete.
    #[arg(required = true)]
    pub item_ids: Vec<i64>,
}

pub fn run_rm(args: &RmArgs, ctx: &CmdContext) -> Result<()> {
    let mut conn = ctx.open_existing_store()?;
    let account = resolve_account(&conn, args.user.as_deref())?;

    let deleted = items::delete_batch(&mut conn, account.user_id, &args.item_ids)?;
    if deleted.is_empty() {
        // Nothing matched: surface it, never silently succeed.
        return Err(LarderError::new(ErrorCode::NothingToDelete).into());
    }

    render(ctx.output, &deleted, |deleted, w| {
        writeln!(w, "Deleted {} item(s):", deleted.len())?;
        for item in deleted {
            writeln!(w, "  #{} {} [{}]", item.item_id, item.item_name, item.category.path())?;
        }
        Ok(())
    })
}
