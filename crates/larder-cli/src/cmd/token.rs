//! `ldr token` — register or clear the push-delivery token.

use super::{CmdContext, resolve_account};
use crate::output::render_success;
use anyhow::Result;
use clap::{Args, Subcommand};
use larder_core::db::users;

#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Acting account (defaults to $LARDER_USER).
    #[arg(long)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub action: TokenAction,
}

#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Register or replace the device token.
    Set { token: String },
    /// Remove the stored token (unsubscribe).
    Clear,
}

pub fn run_token(args: &TokenArgs, ctx: &CmdContext) -> Result<()> {
    let conn = ctx.open_existing_store()?;
    let account = resolve_account(&conn, args.user.as_deref())?;

    match &args.action {
        TokenAction::Set { token } => {
            users::set_push_token(&conn, account.user_id, token)?;
            render_success(ctx.output, "Push token registered")
        }
        TokenAction::Clear => {
            users::clear_push_token(&conn, account.user_id)?;
            render_success(ctx.output, "Push token removed")
        }
    }
}
