//! `ldr notifications` — toggle the expiry-notification preference.

use super::{CmdContext, resolve_account};
use crate::output::render_success;
use anyhow::Result;
use clap::{Args, Subcommand};
use larder_core::db::users;

#[derive(Args, Debug)]
pub struct NotificationsArgs {
    /// Acting account (defaults to $LARDER_USER).
    #[arg(long)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub action: NotificationsAction,
}

#[derive(Subcommand, Debug)]
pub enum NotificationsAction {
    /// Enable expiry notifications.
    On,
    /// Disable notifications (also forgets the device token).
    Off,
}

pub fn run_notifications(args: &NotificationsArgs, ctx: &CmdContext) -> Result<()> {
    let conn = ctx.open_existing_store()?;
    let account = resolve_account(&conn, args.user.as_deref())?;

    match args.action {
        NotificationsAction::On => {
            users::set_notification(&conn, account.user_id, true)?;
            render_success(ctx.output, "Notifications enabled")
        }
        NotificationsAction::Off => {
            users::set_notification(&conn, account.user_id, false)?;
            render_success(ctx.output, "Notifications disabled; token forgotten")
        }
    }
}
