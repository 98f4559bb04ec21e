//! The daily expiry scan.
//!
//! For each configured lead time N, items expiring exactly N days from
//! `today` are matched (an item expiring in N-1 days is someone else's
//! problem tomorrow). Dispatch is at-least-once and best-effort; a
//! successful dispatch is stamped in `notification_log` so a rerun for the
//! same day stays quiet.

use crate::push::{Dispatch, PushNote, PushTransport};
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use larder_core::db::{items, users};
use larder_core::model::Item;
use rusqlite::{Connection, params};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Counters from one scan run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Items whose expiry matched a lead-time target date.
    pub scanned: usize,
    /// Successful dispatches.
    pub delivered: usize,
    /// Items already notified for this (lead time, day).
    pub deduped: usize,
    /// Items skipped silently: notifications off or no token.
    pub skipped: usize,
    /// Tokens cleared after an invalid-token outcome.
    pub invalidated: usize,
    /// Transient dispatch failures left for a later run.
    pub transient: usize,
}

const DATE_FMT: &str = "%Y-%m-%d";

fn already_notified(
    conn: &Connection,
    item_id: i64,
    lead_days: u32,
    today: NaiveDate,
) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM notification_log
            WHERE item_id = ?1 AND lead_days = ?2 AND notified_on = ?3
         )",
        params![item_id, lead_days, today.format(DATE_FMT).to_string()],
        |row| row.get(0),
    )
    .context("check notification log")
}

fn stamp_notified(
    conn: &Connection,
    item_id: i64,
    lead_days: u32,
    today: NaiveDate,
) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO notification_log (item_id, lead_days, notified_on)
         VALUES (?1, ?2, ?3)",
        params![item_id, lead_days, today.format(DATE_FMT).to_string()],
    )
    .context("stamp notification log")?;
    Ok(())
}

fn expiry_note(item: &Item, target: NaiveDate, lead_days: u32) -> PushNote {
    PushNote {
        title: "[larder] Expiry reminder".to_string(),
        body: format!(
            "{} expires on {} ({} day(s) left).",
            item.item_name,
            target.format(DATE_FMT),
            lead_days
        ),
        data: BTreeMap::from([
            ("item_id".to_string(), item.item_id.to_string()),
            ("days".to_string(), lead_days.to_string()),
        ]),
    }
}

/// Run one scan for `today` over every configured lead time.
///
/// Per matching item: skip silently when the owner has notifications off or
/// no token; skip when already stamped for this day; otherwise dispatch.
/// An invalid-token outcome clears the owner's token so the rest of this
/// run (and future runs) skip them; transient failures are logged and the
/// scan continues.
///
/// # Errors
///
/// Returns an error only for store failures; dispatch failures never abort
/// the scan.
pub fn run_scan(
    conn: &Connection,
    transport: &dyn PushTransport,
    lead_days: &[u32],
    today: NaiveDate,
) -> Result<ScanReport> {
    let mut report = ScanReport::default();

    for &lead in lead_days {
        let target = today + Days::new(u64::from(lead));
        let due = items::due_on(conn, target)?;
        report.scanned += due.len();

        for entry in due {
            let item = entry.item;

            // Re-fetch the owner: an earlier invalid token in this same run
            // may already have scrubbed them.
            let Some(owner) = users::get_by_id(conn, item.user_id)? else {
                continue;
            };
            let Some(token) = owner.dispatchable_token() else {
                debug!(item_id = item.item_id, user_id = owner.user_id, "skipping dispatch");
                report.skipped += 1;
                continue;
            };

            if already_notified(conn, item.item_id, lead, today)? {
                report.deduped += 1;
                continue;
            }

            match transport.send(token, &expiry_note(&item, target, lead)) {
                Dispatch::Delivered => {
                    stamp_notified(conn, item.item_id, lead, today)?;
                    report.delivered += 1;
                }
                Dispatch::InvalidToken => {
                    warn!(user_id = owner.user_id, "clearing invalid push token");
                    users::clear_push_token(conn, owner.user_id)?;
                    report.invalidated += 1;
                }
                Dispatch::Transient(reason) => {
                    warn!(item_id = item.item_id, %reason, "push dispatch failed; continuing");
                    report.transient += 1;
                }
            }
        }
    }

    info!(
        scanned = report.scanned,
        delivered = report.delivered,
        deduped = report.deduped,
        skipped = report.skipped,
        invalidated = report.invalidated,
        transient = report.transient,
        "expiry scan complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::{ScanReport, run_scan};
    use crate::push::{Dispatch, PushNote, PushTransport};
    use chrono::{Days, Local, NaiveDate};
    use larder_core::db::{items, open_memory_store, users};
    use larder_core::expiry::ExpiryParser;
    use larder_core::hash::SaltedSha256;
    use larder_core::model::{ItemDraft, Registration};
    use rusqlite::Connection;
    use std::cell::RefCell;

    struct ScriptedTransport {
        outcome: Dispatch,
        sent: RefCell<Vec<(String, PushNote)>>,
    }

    impl ScriptedTransport {
        fn new(outcome: Dispatch) -> Self {
            Self {
                outcome,
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl PushTransport for ScriptedTransport {
        fn send(&self, token: &str, note: &PushNote) -> Dispatch {
            self.sent.borrow_mut().push((token.to_string(), note.clone()));
            self.outcome.clone()
        }
    }

    fn seeded(conn: &mut Connection, shelf_life: &str) -> i64 {
        let user = users::register(
            conn,
            &Registration {
                login_id: "alice".to_string(),
                username: "Alice".to_string(),
                password: "alice123".to_string(),
                password_confirm: "alice123".to_string(),
            },
            &SaltedSha256,
        )
        .expect("register");
        users::set_push_token(conn, user.user_id, "device-1").expect("token");
        items::upsert_batch(
            conn,
            user.user_id,
            &[ItemDraft::new("사과", "식물성", "과일류", shelf_life)],
            &ExpiryParser::default(),
        )
        .expect("seed item");
        user.user_id
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    #[test]
    fn exact_lead_time_match_dispatches() {
        let mut conn = open_memory_store().expect("open store");
        seeded(&mut conn, "3일");

        let transport = ScriptedTransport::new(Dispatch::Delivered);
        let report = run_scan(&conn, &transport, &[3], today()).expect("scan");
        assert_eq!(report.scanned, 1);
        assert_eq!(report.delivered, 1);

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "device-1");
        assert!(sent[0].1.body.contains("사과"));
        assert_eq!(sent[0].1.data.get("days").map(String::as_str), Some("3"));
    }

    #[test]
    fn off_by_one_expiries_are_excluded() {
        let mut conn = open_memory_store().expect("open store");
        seeded(&mut conn, "2일");

        let transport = ScriptedTransport::new(Dispatch::Delivered);
        let report = run_scan(&conn, &transport, &[3], today()).expect("scan");
        assert_eq!(report, ScanReport::default());
        assert!(transport.sent.borrow().is_empty());

        let report = run_scan(&conn, &transport, &[3], today() - Days::new(1)).expect("scan");
        assert_eq!(report.scanned, 1, "shifting the clock back one day matches");
    }

    #[test]
    fn rerun_for_the_same_day_is_deduped() {
        let mut conn = open_memory_store().expect("open store");
        seeded(&mut conn, "3일");

        let transport = ScriptedTransport::new(Dispatch::Delivered);
        run_scan(&conn, &transport, &[3], today()).expect("first scan");
        let second = run_scan(&conn, &transport, &[3], today()).expect("second scan");
        assert_eq!(second.delivered, 0);
        assert_eq!(second.deduped, 1);
        assert_eq!(transport.sent.borrow().len(), 1, "one dispatch total");
    }

    #[test]
    fn disabled_or_tokenless_users_are_skipped_silently() {
        let mut conn = open_memory_store().expect("open store");
        let user_id = seeded(&mut conn, "3일");
        users::set_notification(&conn, user_id, false).expect("disable");

        let transport = ScriptedTransport::new(Dispatch::Delivered);
        let report = run_scan(&conn, &transport, &[3], today()).expect("scan");
        assert_eq!(report.skipped, 1);
        assert_eq!(report.delivered, 0);
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn invalid_token_is_cleared_and_next_scan_skips() {
        let mut conn = open_memory_store().expect("open store");
        let user_id = seeded(&mut conn, "3일");

        let transport = ScriptedTransport::new(Dispatch::InvalidToken);
        let report = run_scan(&conn, &transport, &[3], today()).expect("scan");
        assert_eq!(report.invalidated, 1);

        let owner = users::get_by_id(&conn, user_id)
            .expect("query")
            .expect("present");
        assert!(owner.push_token.is_none(), "token self-healed away");

        // Token gone: the follow-up scan skips without dispatching.
        let quiet = ScriptedTransport::new(Dispatch::Delivered);
        let report = run_scan(&conn, &quiet, &[3], today()).expect("rescan");
        assert_eq!(report.skipped, 1);
        assert!(quiet.sent.borrow().is_empty());
    }

    #[test]
    fn transient_failure_continues_and_retries_next_run() {
        let mut conn = open_memory_store().expect("open store");
        seeded(&mut conn, "3일");

        let flaky = ScriptedTransport::new(Dispatch::Transient("relay 503".to_string()));
        let report = run_scan(&conn, &flaky, &[3], today()).expect("scan");
        assert_eq!(report.transient, 1);
        assert_eq!(report.delivered, 0);

        // Not stamped, so the next run tries again.
        let transport = ScriptedTransport::new(Dispatch::Delivered);
        let report = run_scan(&conn, &transport, &[3], today()).expect("retry scan");
        assert_eq!(report.delivered, 1);
    }

    #[test]
    fn multiple_lead_times_scan_independently() {
        let mut conn = open_memory_store().expect("open store");
        let user_id = seeded(&mut conn, "3일");
        items::upsert_batch(
            &mut conn,
            user_id,
            &[ItemDraft::new("우유", "동물성", "유제품", "1일")],
            &ExpiryParser::default(),
        )
        .expect("seed second item");

        let transport = ScriptedTransport::new(Dispatch::Delivered);
        let report = run_scan(&conn, &transport, &[1, 3], today()).expect("scan");
        assert_eq!(report.scanned, 2);
        assert_eq!(report.delivered, 2);
    }
}
