//! `ldr list` — the user's inventory, most recently added first.

use super::{CmdContext, resolve_account};
use crate::output::render;
use anyhow::Result;
use chrono::DateTime;
use clap::Args;
use larder_core::db::items;
use std::io::Write as _;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Acting account (defaults to $LARDER_USER).
    #[arg(long)]
    pub user: Option<String>,
}

pub fn run_list(args: &ListArgs, ctx: &CmdContext) -> Result<()> {
    let conn = ctx.open_existing_store()?;
    let account = resolve_account(&conn, args.user.as_deref())?;
    let listed = items::list_by_user(&conn, account.user_id)?;

    render(ctx.output, &listed, |listed, w| {
        if listed.is_empty() {
            return writeln!(w, "The larder is empty.");
        }
        for item in listed {
            let expiry = item
                .expiry_date
                .map_or_else(|| "indefinite".to_string(), |date| date.to_string());
            let added = DateTime::from_timestamp_micros(item.created_at_us)
                .map_or_else(String::new, |ts| ts.format("%Y-%m-%d").to_string());
            writeln!(
                w,
                "#{:<5} {:<20} {:<24} expires: {:<12} added: {added}",
                item.item_id,
                item.item_name,
                item.category.path(),
                expiry
            )?;
        }
        Ok(())
    })
}
