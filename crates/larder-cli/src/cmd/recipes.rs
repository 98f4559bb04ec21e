//! `ldr recipes` — recipe suggestions from current stock.

use super::{CmdContext, resolve_account};
use crate::output::render;
use anyhow::Result;
use clap::Args;
use larder_ingest::recipes::{OpenAiAdvisor, recommend_from_stock};
use std::io::Write as _;

#[derive(Args, Debug)]
pub struct RecipesArgs {
    /// Acting account (defaults to $LARDER_USER).
    #[arg(long)]
    pub user: Option<String>,

    /// What kind of dish, e.g. "simple lunchbox" or "맵지 않은 요리".
    #[arg(short, long)]
    pub request: String,
}

pub fn run_recipes(args: &RecipesArgs, ctx: &CmdContext) -> Result<()> {
    let conn = ctx.open_existing_store()?;
    let account = resolve_account(&conn, args.user.as_deref())?;

    let advisor = OpenAiAdvisor::from_config(&ctx.config.openai)?;
    let reply = recommend_from_stock(&conn, account.user_id, &args.request, &advisor)?;

    render(ctx.output, &reply, |reply, w| writeln!(w, "{reply}"))
}
