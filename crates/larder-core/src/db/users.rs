//! Account storage: registration, credential checks, notification
//! preferences, and push-token upkeep.

use crate::error::{ErrorCode, LarderError};
use crate::hash::CredentialHasher;
use crate::model::{Registration, User};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        login_id: row.get(1)?,
        username: row.get(2)?,
        password_hash: row.get(3)?,
        notification: row.get(4)?,
        push_token: row.get(5)?,
    })
}

const USER_COLUMNS: &str = "user_id, login_id, username, password_hash, notification, push_token";

/// Fetch a user by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_by_id(conn: &Connection, user_id: i64) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
        params![user_id],
        user_from_row,
    )
    .optional()
    .with_context(|| format!("fetch user {user_id}"))
}

/// Fetch a user by login id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_by_login_id(conn: &Connection, login_id: &str) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE login_id = ?1"),
        params![login_id],
        user_from_row,
    )
    .optional()
    .with_context(|| format!("fetch user by login id {login_id}"))
}

/// Register a new account.
///
/// Conflicts are pre-checked so login-id and username collisions surface as
/// distinct codes rather than a bare constraint error.
///
/// # Errors
///
/// Returns validation errors from [`Registration::validate`],
/// [`ErrorCode::DuplicateLoginId`] / [`ErrorCode::DuplicateUsername`] on
/// conflict, or a database error.
pub fn register(
    conn: &mut Connection,
    registration: &Registration,
    hasher: &dyn CredentialHasher,
) -> Result<User> {
    registration.validate()?;

    let tx = conn.transaction().context("begin registration")?;

    let login_taken: bool = tx
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE login_id = ?1)",
            params![registration.login_id],
            |row| row.get(0),
        )
        .context("check login id")?;
    if login_taken {
        return Err(
            LarderError::with_detail(ErrorCode::DuplicateLoginId, &registration.login_id).into(),
        );
    }

    let username_taken: bool = tx
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            params![registration.username],
            |row| row.get(0),
        )
        .context("check username")?;
    if username_taken {
        return Err(
            LarderError::with_detail(ErrorCode::DuplicateUsername, &registration.username).into(),
        );
    }

    tx.execute(
        "INSERT INTO users (login_id, username, password_hash) VALUES (?1, ?2, ?3)",
        params![
            registration.login_id,
            registration.username,
            hasher.hash(&registration.password)
        ],
    )
    .context("insert user")?;
    let user_id = tx.last_insert_rowid();
    tx.commit().context("commit registration")?;

    info!(user_id, login_id = %registration.login_id, "registered account");

    get_by_id(conn, user_id)?
        .ok_or_else(|| LarderError::new(ErrorCode::InternalUnexpected).into())
}

/// Verify credentials and return the account.
///
/// # Errors
///
/// [`ErrorCode::UserNotFound`] for an unknown login id,
/// [`ErrorCode::WrongPassword`] when verification fails.
pub fn authenticate(
    conn: &Connection,
    login_id: &str,
    password: &str,
    hasher: &dyn CredentialHasher,
) -> Result<User> {
    let user = get_by_login_id(conn, login_id)?
        .ok_or_else(|| LarderError::with_detail(ErrorCode::UserNotFound, login_id))?;
    if !hasher.verify(password, &user.password_hash) {
        return Err(LarderError::new(ErrorCode::WrongPassword).into());
    }
    Ok(user)
}

/// Delete an account after re-verifying the password. Owned items (and
/// their notification-log rows) go with it via cascade.
///
/// # Errors
///
/// [`ErrorCode::UserNotFound`], [`ErrorCode::WrongPassword`], or a database
/// error.
pub fn delete_account(
    conn: &mut Connection,
    user_id: i64,
    password: &str,
    hasher: &dyn CredentialHasher,
) -> Result<()> {
    let tx = conn.transaction().context("begin account deletion")?;

    let user = tx
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            params![user_id],
            user_from_row,
        )
        .optional()
        .context("fetch user for deletion")?
        .ok_or_else(|| LarderError::with_detail(ErrorCode::UserNotFound, user_id.to_string()))?;

    if !hasher.verify(password, &user.password_hash) {
        return Err(LarderError::new(ErrorCode::WrongPassword).into());
    }

    tx.execute("DELETE FROM users WHERE user_id = ?1", params![user_id])
        .context("delete user")?;
    tx.commit().context("commit account deletion")?;

    info!(user_id, login_id = %user.login_id, "deleted account");
    Ok(())
}

/// Change the display name after password verification; the new name must
/// be free.
///
/// # Errors
///
/// [`ErrorCode::UserNotFound`], [`ErrorCode::WrongPassword`],
/// [`ErrorCode::EmptyField`], or [`ErrorCode::DuplicateUsername`].
pub fn rename(
    conn: &mut Connection,
    user_id: i64,
    password: &str,
    new_username: &str,
    hasher: &dyn CredentialHasher,
) -> Result<User> {
    if new_username.trim().is_empty() {
        return Err(LarderError::with_detail(ErrorCode::EmptyField, "username").into());
    }

    let tx = conn.transaction().context("begin rename")?;

    let user = tx
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            params![user_id],
            user_from_row,
        )
        .optional()
        .context("fetch user for rename")?
        .ok_or_else(|| LarderError::with_detail(ErrorCode::UserNotFound, user_id.to_string()))?;

    if !hasher.verify(password, &user.password_hash) {
        return Err(LarderError::new(ErrorCode::WrongPassword).into());
    }

    let taken: bool = tx
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 AND user_id <> ?2)",
            params![new_username, user_id],
            |row| row.get(0),
        )
        .context("check new username")?;
    if taken {
        return Err(LarderError::with_detail(ErrorCode::DuplicateUsername, new_username).into());
    }

    tx.execute(
        "UPDATE users SET username = ?1 WHERE user_id = ?2",
        params![new_username, user_id],
    )
    .context("update username")?;
    tx.commit().context("commit rename")?;

    get_by_id(conn, user_id)?
        .ok_or_else(|| LarderError::new(ErrorCode::InternalUnexpected).into())
}

/// Replace the credential after verifying the current one.
///
/// # Errors
///
/// [`ErrorCode::UserNotFound`], [`ErrorCode::WrongPassword`], or
/// [`ErrorCode::EmptyField`] for a blank new password.
pub fn change_password(
    conn: &mut Connection,
    user_id: i64,
    current: &str,
    new_password: &str,
    hasher: &dyn CredentialHasher,
) -> Result<()> {
    if new_password.trim().is_empty() {
        return Err(LarderError::with_detail(ErrorCode::EmptyField, "password").into());
    }

    let tx = conn.transaction().context("begin password change")?;

    let user = tx
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            params![user_id],
            user_from_row,
        )
        .optional()
        .context("fetch user for password change")?
        .ok_or_else(|| LarderError::with_detail(ErrorCode::UserNotFound, user_id.to_string()))?;

    if !hasher.verify(current, &user.password_hash) {
        return Err(LarderError::new(ErrorCode::WrongPassword).into());
    }

    tx.execute(
        "UPDATE users SET password_hash = ?1 WHERE user_id = ?2",
        params![hasher.hash(new_password), user_id],
    )
    .context("update password hash")?;
    tx.commit().context("commit password change")
}

/// Register or replace the push-delivery token.
///
/// # Errors
///
/// [`ErrorCode::UserNotFound`], [`ErrorCode::EmptyField`] for a blank
/// token, or [`ErrorCode::NotificationsDisabled`] while the preference is
/// off (mirrors the mobile client contract: re-enable first).
pub fn set_push_token(conn: &Connection, user_id: i64, token: &str) -> Result<()> {
    if token.trim().is_empty() {
        return Err(LarderError::with_detail(ErrorCode::EmptyField, "token").into());
    }

    let user = get_by_id(conn, user_id)?
        .ok_or_else(|| LarderError::with_detail(ErrorCode::UserNotFound, user_id.to_string()))?;
    if !user.notification {
        return Err(LarderError::new(ErrorCode::NotificationsDisabled).into());
    }

    conn.execute(
        "UPDATE users SET push_token = ?1 WHERE user_id = ?2",
        params![token, user_id],
    )
    .context("store push token")?;
    Ok(())
}

/// Drop the stored push token (unsubscribe, or self-healing after an
/// invalid-token dispatch result).
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn clear_push_token(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET push_token = NULL WHERE user_id = ?1",
        params![user_id],
    )
    .context("clear push token")?;
    Ok(())
}

/// Toggle the notification preference. Disabling also clears the token so
/// stale devices never receive a stray dispatch.
///
/// # Errors
///
/// [`ErrorCode::UserNotFound`] or a database error.
pub fn set_notification(conn: &Connection, user_id: i64, enabled: bool) -> Result<()> {
    let changed = if enabled {
        conn.execute(
            "UPDATE users SET notification = 1 WHERE user_id = ?1",
            params![user_id],
        )
    } else {
        conn.execute(
            "UPDATE users SET notification = 0, push_token = NULL WHERE user_id = ?1",
            params![user_id],
        )
    }
    .context("update notification preference")?;

    if changed == 0 {
        return Err(LarderError::with_detail(ErrorCode::UserNotFound, user_id.to_string()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        authenticate, change_password, clear_push_token, delete_account, get_by_id,
        get_by_login_id, register, rename, set_notification, set_push_token,
    };
    use crate::db::open_memory_store;
    use crate::error::{ErrorCode, LarderError};
    use crate::hash::SaltedSha256;
    use crate::model::Registration;
    use rusqlite::Connection;

    fn code_of(err: &anyhow::Error) -> Option<ErrorCode> {
        err.downcast_ref::<LarderError>().map(LarderError::code)
    }

    fn registration(login_id: &str, username: &str) -> Registration {
        Registration {
            login_id: login_id.to_string(),
            username: username.to_string(),
            password: "alice123".to_string(),
            password_confirm: "alice123".to_string(),
        }
    }

    fn registered(conn: &mut Connection, login_id: &str, username: &str) -> i64 {
        register(conn, &registration(login_id, username), &SaltedSha256)
            .expect("register")
            .user_id
    }

    #[test]
    fn register_and_fetch_round_trips() {
        let mut conn = open_memory_store().expect("open store");
        let user_id = registered(&mut conn, "alice", "Alice");

        let user = get_by_id(&conn, user_id).expect("query").expect("present");
        assert_eq!(user.login_id, "alice");
        assert_eq!(user.username, "Alice");
        assert!(user.notification, "notifications default to on");
        assert!(user.push_token.is_none());

        let by_login = get_by_login_id(&conn, "alice")
            .expect("query")
            .expect("present");
        assert_eq!(by_login.user_id, user_id);
    }

    #[test]
    fn duplicate_login_and_username_are_distinct_conflicts() {
        let mut conn = open_memory_store().expect("open store");
        registered(&mut conn, "alice", "Alice");

        let err = register(&mut conn, &registration("alice", "Bob"), &SaltedSha256)
            .expect_err("duplicate login id");
        assert_eq!(code_of(&err), Some(ErrorCode::DuplicateLoginId));

        let err = register(&mut conn, &registration("bob", "Alice"), &SaltedSha256)
            .expect_err("duplicate username");
        assert_eq!(code_of(&err), Some(ErrorCode::DuplicateUsername));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .expect("count users");
        assert_eq!(count, 1, "failed registrations must not persist");
    }

    #[test]
    fn authenticate_checks_credentials() {
        let mut conn = open_memory_store().expect("open store");
        registered(&mut conn, "alice", "Alice");

        let user = authenticate(&conn, "alice", "alice123", &SaltedSha256).expect("auth ok");
        assert_eq!(user.login_id, "alice");

        let err =
            authenticate(&conn, "alice", "wrong", &SaltedSha256).expect_err("wrong password");
        assert_eq!(code_of(&err), Some(ErrorCode::WrongPassword));

        let err = authenticate(&conn, "nobody", "x", &SaltedSha256).expect_err("unknown user");
        assert_eq!(code_of(&err), Some(ErrorCode::UserNotFound));
    }

    #[test]
    fn delete_account_requires_password_and_cascades() {
        let mut conn = open_memory_store().expect("open store");
        let user_id = registered(&mut conn, "alice", "Alice");
        conn.execute(
            "INSERT INTO categories (major_name, sub_name) VALUES ('식물성', '과일류')",
            [],
        )
        .expect("seed category");
        conn.execute(
            "INSERT INTO items (user_id, category_id, item_name, created_at_us)
             VALUES (?1, 1, '사과', 0)",
            [user_id],
        )
        .expect("seed item");

        let err = delete_account(&mut conn, user_id, "wrong", &SaltedSha256)
            .expect_err("wrong password");
        assert_eq!(code_of(&err), Some(ErrorCode::WrongPassword));

        delete_account(&mut conn, user_id, "alice123", &SaltedSha256).expect("delete");
        assert!(get_by_id(&conn, user_id).expect("query").is_none());
        let items: i64 = conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
            .expect("count items");
        assert_eq!(items, 0, "owned items must cascade");
    }

    #[test]
    fn rename_enforces_uniqueness() {
        let mut conn = open_memory_store().expect("open store");
        let alice = registered(&mut conn, "alice", "Alice");
        registered(&mut conn, "bob", "Bob");

        let err = rename(&mut conn, alice, "alice123", "Bob", &SaltedSha256)
            .expect_err("taken username");
        assert_eq!(code_of(&err), Some(ErrorCode::DuplicateUsername));

        let renamed = rename(&mut conn, alice, "alice123", "Alicia", &SaltedSha256)
            .expect("rename");
        assert_eq!(renamed.username, "Alicia");
    }

    #[test]
    fn change_password_rotates_credential() {
        let mut conn = open_memory_store().expect("open store");
        let user_id = registered(&mut conn, "alice", "Alice");

        change_password(&mut conn, user_id, "alice123", "new-secret", &SaltedSha256)
            .expect("change");
        authenticate(&conn, "alice", "new-secret", &SaltedSha256).expect("new password works");
        let err = authenticate(&conn, "alice", "alice123", &SaltedSha256)
            .expect_err("old password dead");
        assert_eq!(code_of(&err), Some(ErrorCode::WrongPassword));
    }

    #[test]
    fn token_registration_respects_preference() {
        let mut conn = open_memory_store().expect("open store");
        let user_id = registered(&mut conn, "alice", "Alice");

        set_push_token(&conn, user_id, "device-1").expect("set token");
        let user = get_by_id(&conn, user_id).expect("query").expect("present");
        assert_eq!(user.push_token.as_deref(), Some("device-1"));

        // Disabling clears the token; registering while disabled is refused.
        set_notification(&conn, user_id, false).expect("disable");
        let user = get_by_id(&conn, user_id).expect("query").expect("present");
        assert!(!user.notification);
        assert!(user.push_token.is_none());

        let err = set_push_token(&conn, user_id, "device-2").expect_err("disabled");
        assert_eq!(code_of(&err), Some(ErrorCode::NotificationsDisabled));

        set_notification(&conn, user_id, true).expect("enable");
        set_push_token(&conn, user_id, "device-2").expect("set token again");
        clear_push_token(&conn, user_id).expect("clear");
        let user = get_by_id(&conn, user_id).expect("query").expect("present");
        assert!(user.push_token.is_none());
    }
}
