//! `ldr watch` — run the daily expiry scheduler in the foreground.

use super::CmdContext;
use crate::cmd::scan::gateway_from_config;
use anyhow::Result;
use chrono::Local;
use clap::Args;
use larder_core::db;
use larder_core::error::{ErrorCode, LarderError};
use larder_notify::scan::run_scan;
use larder_notify::scheduler::{DailyScheduler, FireTime};
use tracing::{error, info};

#[derive(Args, Debug)]
pub struct WatchArgs {}

pub fn run_watch(_args: &WatchArgs, ctx: &CmdContext) -> Result<()> {
    // Fail fast on a missing store or relay before parking for hours.
    drop(ctx.open_existing_store()?);
    let transport = gateway_from_config(ctx)?;

    let fire = FireTime::new(ctx.config.notify.hour, ctx.config.notify.minute)
        .ok_or_else(|| {
            LarderError::with_detail(
                ErrorCode::ConfigParseError,
                format!(
                    "[notify] hour/minute out of range: {}:{}",
                    ctx.config.notify.hour, ctx.config.notify.minute
                ),
            )
        })?;

    let db_path = ctx.db_path.clone();
    let lead_days = ctx.config.notify.lead_days.clone();
    let _scheduler = DailyScheduler::start(fire, move || {
        // Each run gets a fresh connection; a failed run is retried from
        // scratch on the next fire.
        match db::open_store(&db_path) {
            Ok(conn) => {
                if let Err(err) = run_scan(&conn, &transport, &lead_days, Local::now().date_naive())
                {
                    error!(?err, "scheduled expiry scan failed");
                }
            }
            Err(err) => error!(?err, "could not open store for scheduled scan"),
        }
    });

    info!(
        hour = fire.hour(),
        minute = fire.minute(),
        "scheduler running; press Ctrl-C to exit"
    );

    // Park until the process is terminated; the scheduler thread does the
    // work. Spurious unparks are harmless.
    loop {
        std::thread::park();
    }
}
