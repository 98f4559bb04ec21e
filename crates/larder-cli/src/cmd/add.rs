//! `ldr add` — create a single inventory item directly.

use super::{CmdContext, resolve_account};
use crate::output::render;
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use larder_core::db::items;
use larder_core::model::ItemDraft;
use std::io::Write as _;

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD, got {raw:?}: {err}"))
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Acting account (defaults to $LARDER_USER).
    #[arg(long)]
    pub user: Option<String>,

    /// Item name.
    #[arg(short, long)]
    pub name: String,

    /// Major category name.
    #[arg(long)]
    pub major: String,

    /// Sub category name.
    #[arg(long)]
    pub sub: String,

    /// Exact expiry date (YYYY-MM-DD); wins over --shelf-life.
    #[arg(long, value_parser = parse_date)]
    pub expires: Option<NaiveDate>,

    /// Free-text shelf life, e.g. "30일" or "무기한".
    #[arg(long, default_value = "")]
    pub shelf_life: String,
}

pub fn run_add(args: &AddArgs, ctx: &CmdContext) -> Result<()> {
    let mut conn = ctx.open_existing_store()?;
    let account = resolve_account(&conn, args.user.as_deref())?;

    let mut draft = ItemDraft::new(&args.name, &args.major, &args.sub, &args.shelf_life);
    if let Some(date) = args.expires {
        draft = draft.with_expiry_date(date);
    }

    let item = items::insert_one(&mut conn, account.user_id, &draft, &ctx.parser())?;
    render(ctx.output, &item, |item, w| {
        let expiry = item
            .expiry_date
            .map_or_else(|| "indefinite".to_string(), |date| date.to_string());
        writeln!(
            w,
            "Added #{} {} [{}] expires: {expiry}",
            item.item_id,
            item.item_name,
            item.category.path()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::parse_date;
    use chrono::NaiveDate;

    #[test]
    fn date_parser_accepts_iso_only() {
        assert_eq!(
            parse_date("2025-12-31"),
            Ok(NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date"))
        );
        assert!(parse_date("31-12-2025").is_err());
        assert!(parse_date("2025-13-01").is_err());
    }
}
