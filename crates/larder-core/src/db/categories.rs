//! Category taxonomy resolution.
//!
//! The `(major_name, sub_name)` pair is the natural key. Resolution is
//! insert-or-fetch under the storage-level unique constraint, so concurrent
//! resolves of the same new pair converge on one row.

use crate::error::{ErrorCode, LarderError};
use crate::model::Category;
use anyhow::{Context, Result};
use rusqlite::{Connection, params};

/// Look up (creating on first use) the category for a taxonomy pair and
/// return its id. Safe to call repeatedly and concurrently with the same
/// pair.
///
/// # Errors
///
/// Returns [`ErrorCode::EmptyCategoryName`] when either name is blank after
/// trimming, or a database error.
pub fn resolve(conn: &Connection, major: &str, sub: &str) -> Result<i64> {
    let major = major.trim();
    let sub = sub.trim();
    if major.is_empty() || sub.is_empty() {
        return Err(LarderError::with_detail(
            ErrorCode::EmptyCategoryName,
            format!("({major:?}, {sub:?})"),
        )
        .into());
    }

    conn.execute(
        "INSERT INTO categories (major_name, sub_name)
         VALUES (?1, ?2)
         ON CONFLICT (major_name, sub_name) DO NOTHING",
        params![major, sub],
    )
    .context("insert category")?;

    conn.query_row(
        "SELECT category_id FROM categories WHERE major_name = ?1 AND sub_name = ?2",
        params![major, sub],
        |row| row.get(0),
    )
    .with_context(|| format!("fetch category id for ({major}, {sub})"))
}

/// All taxonomy rows, ordered by major then sub name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_all(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn
        .prepare(
            "SELECT category_id, major_name, sub_name
             FROM categories
             ORDER BY major_name ASC, sub_name ASC",
        )
        .context("prepare category listing")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(Category {
                category_id: row.get(0)?,
                major_name: row.get(1)?,
                sub_name: row.get(2)?,
            })
        })
        .context("list categories")?
        .collect::<Result<Vec<_>, _>>()
        .context("decode category rows")?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::{list_all, resolve};
    use crate::db::open_memory_store;
    use crate::error::{ErrorCode, LarderError};

    #[test]
    fn resolve_is_idempotent() {
        let conn = open_memory_store().expect("open store");

        let first = resolve(&conn, "식물성", "과일류").expect("first resolve");
        let second = resolve(&conn, "식물성", "과일류").expect("second resolve");
        assert_eq!(first, second);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
            .expect("count categories");
        assert_eq!(count, 1);
    }

    #[test]
    fn distinct_pairs_get_distinct_ids() {
        let conn = open_memory_store().expect("open store");

        let fruit = resolve(&conn, "식물성", "과일류").expect("resolve fruit");
        let veg = resolve(&conn, "식물성", "채소류").expect("resolve veg");
        let meat = resolve(&conn, "동물성", "육류").expect("resolve meat");
        assert_ne!(fruit, veg);
        assert_ne!(veg, meat);
    }

    #[test]
    fn names_are_trimmed_to_one_canonical_row() {
        let conn = open_memory_store().expect("open store");

        let padded = resolve(&conn, " 식물성 ", "과일류 ").expect("resolve padded");
        let plain = resolve(&conn, "식물성", "과일류").expect("resolve plain");
        assert_eq!(padded, plain);
    }

    #[test]
    fn blank_names_are_rejected() {
        let conn = open_memory_store().expect("open store");

        let err = resolve(&conn, "  ", "과일류").expect_err("must reject");
        let code = err
            .downcast_ref::<LarderError>()
            .map(LarderError::code)
            .expect("larder error");
        assert_eq!(code, ErrorCode::EmptyCategoryName);
    }

    #[test]
    fn list_all_orders_by_name() {
        let conn = open_memory_store().expect("open store");
        resolve(&conn, "동물성", "육류").expect("resolve");
        resolve(&conn, "식물성", "채소류").expect("resolve");
        resolve(&conn, "식물성", "과일류").expect("resolve");

        let listed = list_all(&conn).expect("list");
        let paths: Vec<String> = listed.iter().map(super::Category::path).collect();
        assert_eq!(paths, vec!["동물성 > 육류", "식물성 > 과일류", "식물성 > 채소류"]);
    }
}
