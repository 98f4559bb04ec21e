//! Inventory rows: the batch reconciler (upsert engine), listing, scoped
//! deletion, and the expiry-scan query.
//!
//! The reconciler's dedup key is `(user_id, item_name, category_id)`. The
//! key is enforced here rather than by a storage constraint: the keyed
//! lookup runs inside the batch transaction, so a duplicate later in the
//! same batch observes the earlier, still-uncommitted write and updates it
//! (last-write-wins within a batch).

use super::{categories, users};
use crate::error::{ErrorCode, LarderError};
use crate::expiry::{Expiry, ExpiryParser};
use crate::model::{Category, Item, ItemDraft, User};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter, types::Type};
use tracing::debug;

const ITEM_COLUMNS: &str = "i.item_id, i.user_id, i.item_name, i.expiry_date, i.created_at_us,
     c.category_id, c.major_name, c.sub_name";

const DATE_FMT: &str = "%Y-%m-%d";

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let expiry_date = row
        .get::<_, Option<String>>(3)?
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, DATE_FMT).map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error))
            })
        })
        .transpose()?;

    Ok(Item {
        item_id: row.get(0)?,
        user_id: row.get(1)?,
        item_name: row.get(2)?,
        expiry_date,
        created_at_us: row.get(4)?,
        category: Category {
            category_id: row.get(5)?,
            major_name: row.get(6)?,
            sub_name: row.get(7)?,
        },
    })
}

fn encode_date(expiry: Expiry) -> Option<String> {
    expiry.date().map(|date| date.format(DATE_FMT).to_string())
}

/// Fetch one row with its category attached.
///
/// # Errors
///
/// Returns an error if the query fails or the row is gone.
pub fn get(conn: &Connection, item_id: i64) -> Result<Item> {
    conn.query_row(
        &format!(
            "SELECT {ITEM_COLUMNS}
             FROM items i
             JOIN categories c ON c.category_id = i.category_id
             WHERE i.item_id = ?1"
        ),
        params![item_id],
        item_from_row,
    )
    .with_context(|| format!("fetch item {item_id}"))
}

/// Reconcile one incoming descriptor inside an open transaction: resolve
/// the category, settle the expiry, then update the keyed row or insert a
/// new one. Returns the affected row id.
fn reconcile_one(
    tx: &Connection,
    user_id: i64,
    draft: &ItemDraft,
    parser: &ExpiryParser,
    today: NaiveDate,
    now_us: i64,
) -> Result<i64> {
    let name = draft.item_name.trim();
    if name.is_empty() {
        return Err(LarderError::new(ErrorCode::EmptyItemName).into());
    }

    let category_id = categories::resolve(tx, &draft.major_name, &draft.sub_name)?;

    // An explicit date from the caller always wins over re-deriving.
    let expiry = draft
        .expiry_override
        .map_or_else(|| parser.parse(&draft.expiry_text, today), Expiry::On);
    let expiry_date = encode_date(expiry);

    let existing: Option<i64> = tx
        .query_row(
            "SELECT item_id FROM items
             WHERE user_id = ?1 AND item_name = ?2 AND category_id = ?3",
            params![user_id, name, category_id],
            |row| row.get(0),
        )
        .optional()
        .context("look up dedup key")?;

    match existing {
        Some(item_id) => {
            // Name and category are the lookup key; only expiry and the
            // reconcile timestamp move.
            tx.execute(
                "UPDATE items SET expiry_date = ?1, created_at_us = ?2 WHERE item_id = ?3",
                params![expiry_date, now_us, item_id],
            )
            .context("update reconciled item")?;
            debug!(item_id, name, "reconciled into existing row");
            Ok(item_id)
        }
        None => {
            tx.execute(
                "INSERT INTO items (user_id, category_id, item_name, expiry_date, created_at_us)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![user_id, category_id, name, expiry_date, now_us],
            )
            .context("insert reconciled item")?;
            let item_id = tx.last_insert_rowid();
            debug!(item_id, name, "inserted new row");
            Ok(item_id)
        }
    }
}

/// Reconcile a batch of incoming descriptors for one user.
///
/// The whole batch is one transaction: any failure rolls back every row.
/// After the commit each affected row is re-read (category attached) and
/// returned in input order.
///
/// # Errors
///
/// [`ErrorCode::UserNotFound`] for an unknown owner,
/// [`ErrorCode::EmptyItemName`] / [`ErrorCode::EmptyCategoryName`] for
/// blank input, or a database error.
pub fn upsert_batch(
    conn: &mut Connection,
    user_id: i64,
    drafts: &[ItemDraft],
    parser: &ExpiryParser,
) -> Result<Vec<Item>> {
    if users::get_by_id(conn, user_id)?.is_none() {
        return Err(LarderError::with_detail(ErrorCode::UserNotFound, user_id.to_string()).into());
    }

    let today = Local::now().date_naive();
    let now_us = Utc::now().timestamp_micros();

    let tx = conn.transaction().context("begin upsert batch")?;
    let mut ids = Vec::with_capacity(drafts.len());
    for draft in drafts {
        ids.push(reconcile_one(&tx, user_id, draft, parser, today, now_us)?);
    }
    tx.commit().context("commit upsert batch")?;

    debug!(user_id, count = ids.len(), "reconciled batch");
    ids.into_iter().map(|id| get(conn, id)).collect()
}

/// Direct single-item creation (no dedup lookup).
///
/// # Errors
///
/// Same failure modes as [`upsert_batch`].
pub fn insert_one(
    conn: &mut Connection,
    user_id: i64,
    draft: &ItemDraft,
    parser: &ExpiryParser,
) -> Result<Item> {
    if users::get_by_id(conn, user_id)?.is_none() {
        return Err(LarderError::with_detail(ErrorCode::UserNotFound, user_id.to_string()).into());
    }

    let name = draft.item_name.trim();
    if name.is_empty() {
        return Err(LarderError::new(ErrorCode::EmptyItemName).into());
    }

    let today = Local::now().date_naive();
    let now_us = Utc::now().timestamp_micros();

    let tx = conn.transaction().context("begin item creation")?;
    let category_id = categories::resolve(&tx, &draft.major_name, &draft.sub_name)?;
    let expiry = draft
        .expiry_override
        .map_or_else(|| parser.parse(&draft.expiry_text, today), Expiry::On);
    tx.execute(
        "INSERT INTO items (user_id, category_id, item_name, expiry_date, created_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, category_id, name, encode_date(expiry), now_us],
    )
    .context("insert item")?;
    let item_id = tx.last_insert_rowid();
    tx.commit().context("commit item creation")?;

    get(conn, item_id)
}

/// All items owned by `user_id`, most recently reconciled first, category
/// attached.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_by_user(conn: &Connection, user_id: i64) -> Result<Vec<Item>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ITEM_COLUMNS}
             FROM items i
             JOIN categories c ON c.category_id = i.category_id
             WHERE i.user_id = ?1
             ORDER BY i.created_at_us DESC, i.item_id DESC"
        ))
        .context("prepare item listing")?;

    let rows = stmt
        .query_map(params![user_id], item_from_row)
        .context("list items")?
        .collect::<Result<Vec<_>, _>>()
        .context("decode item rows")?;

    Ok(rows)
}

/// Delete the subset of `item_ids` that exist and are owned by `user_id`,
/// in one transaction, returning the deleted rows (fetched before
/// deletion) for confirmation.
///
/// An empty result means nothing matched; callers surface that as a
/// not-found-style outcome rather than silent success.
///
/// # Errors
///
/// Returns an error if any statement fails (the whole batch rolls back).
pub fn delete_batch(conn: &mut Connection, user_id: i64, item_ids: &[i64]) -> Result<Vec<Item>> {
    if item_ids.is_empty() {
        return Ok(Vec::new());
    }

    let tx = conn.transaction().context("begin delete batch")?;

    let placeholders = vec!["?"; item_ids.len()].join(", ");
    let mut owned = {
        let mut stmt = tx
            .prepare(&format!(
                "SELECT {ITEM_COLUMNS}
                 FROM items i
                 JOIN categories c ON c.category_id = i.category_id
                 WHERE i.item_id IN ({placeholders})"
            ))
            .context("prepare delete lookup")?;
        stmt.query_map(params_from_iter(item_ids.iter()), item_from_row)
            .context("fetch rows to delete")?
            .collect::<Result<Vec<_>, _>>()
            .context("decode rows to delete")?
    };
    // Ownership scoping: ids belonging to someone else are silently dropped
    // from the subset, never deleted.
    owned.retain(|item| item.user_id == user_id);

    for item in &owned {
        tx.execute("DELETE FROM items WHERE item_id = ?1", params![item.item_id])
            .context("delete item")?;
    }
    tx.commit().context("commit delete batch")?;

    debug!(user_id, deleted = owned.len(), "deleted items");
    Ok(owned)
}

/// An item due for notification together with its owner.
#[derive(Debug, Clone)]
pub struct DueItem {
    pub item: Item,
    pub owner: User,
}

/// Items whose expiry date equals exactly `target` (indefinite rows never
/// match), joined with their owners.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn due_on(conn: &Connection, target: NaiveDate) -> Result<Vec<DueItem>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ITEM_COLUMNS},
                    u.user_id, u.login_id, u.username, u.password_hash,
                    u.notification, u.push_token
             FROM items i
             JOIN categories c ON c.category_id = i.category_id
             JOIN users u ON u.user_id = i.user_id
             WHERE i.expiry_date = ?1
             ORDER BY i.item_id ASC"
        ))
        .context("prepare due-item scan")?;

    let rows = stmt
        .query_map(params![target.format(DATE_FMT).to_string()], |row| {
            let item = item_from_row(row)?;
            let owner = User {
                user_id: row.get(8)?,
                login_id: row.get(9)?,
                username: row.get(10)?,
                password_hash: row.get(11)?,
                notification: row.get(12)?,
                push_token: row.get(13)?,
            };
            Ok(DueItem { item, owner })
        })
        .context("scan due items")?
        .collect::<Result<Vec<_>, _>>()
        .context("decode due items")?;

    Ok(rows)
}
