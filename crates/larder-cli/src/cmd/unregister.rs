//! `ldr unregister` — delete the account (password re-verified; owned
//! items cascade away).

use super::{CmdContext, resolve_account};
use crate::output::render_success;
use anyhow::Result;
use clap::Args;
use larder_core::db::users;
use larder_core::hash::SaltedSha256;

#[derive(Args, Debug)]
pub struct UnregisterArgs {
    /// Acting account (defaults to $LARDER_USER).
    #[arg(long)]
    pub user: Option<String>,

    /// Current password, re-verified before deletion.
    #[arg(long)]
    pub password: String,
}

pub fn run_unregister(args: &UnregisterArgs, ctx: &CmdContext) -> Result<()> {
    let mut conn = ctx.open_existing_store()?;
    let account = resolve_account(&conn, args.user.as_deref())?;
    users::delete_account(&mut conn, account.user_id, &args.password, &SaltedSha256)?;
    render_success(
        ctx.output,
        &format!("Deleted account {} and all owned items", account.login_id),
    )
}
