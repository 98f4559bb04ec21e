//! `ldr scan` — run one expiry scan immediately.

use super::CmdContext;
use crate::cmd::add::parse_date;
use crate::output::render;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Args;
use larder_core::error::{ErrorCode, LarderError};
use larder_notify::push::HttpGateway;
use larder_notify::scan::run_scan as scan_once;
use std::io::Write as _;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Scan as if today were this date (operator override).
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

pub fn run_scan(args: &ScanArgs, ctx: &CmdContext) -> Result<()> {
    let conn = ctx.open_existing_store()?;
    let transport = gateway_from_config(ctx)?;

    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    let report = scan_once(&conn, &transport, &ctx.config.notify.lead_days, today)?;

    render(ctx.output, &report, |report, w| {
        writeln!(
            w,
            "Scan for {today}: {} matched, {} delivered, {} deduped, {} skipped, \
             {} tokens invalidated, {} transient failures",
            report.scanned,
            report.delivered,
            report.deduped,
            report.skipped,
            report.invalidated,
            report.transient
        )
    })
}

pub(crate) fn gateway_from_config(ctx: &CmdContext) -> Result<HttpGateway> {
    let endpoint = ctx
        .config
        .push
        .endpoint
        .as_deref()
        .ok_or_else(|| LarderError::new(ErrorCode::PushEndpointUnset))?;
    let auth_token = std::env::var(&ctx.config.push.auth_token_env)
        .ok()
        .filter(|value| !value.trim().is_empty());
    Ok(HttpGateway::new(endpoint, auth_token))
}
