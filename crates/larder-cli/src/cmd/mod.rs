//! Command handlers, one module per subcommand, plus the shared context
//! they run in.

pub mod add;
pub mod categories;
pub mod completions;
pub mod ingest;
pub mod init;
pub mod list;
pub mod notifications;
pub mod recipes;
pub mod register;
pub mod rm;
pub mod scan;
pub mod token;
pub mod unregister;
pub mod watch;

use crate::output::OutputMode;
use anyhow::Result;
use larder_core::config::LarderConfig;
use larder_core::db::{self, users};
use larder_core::error::{ErrorCode, LarderError};
use larder_core::expiry::ExpiryParser;
use larder_core::model::User;
use rusqlite::Connection;
use std::path::PathBuf;

/// Everything a command handler needs: resolved config, store path, and
/// output mode.
pub struct CmdContext {
    pub config: LarderConfig,
    pub db_path: PathBuf,
    pub output: OutputMode,
}

impl CmdContext {
    /// Open the store, requiring that `ldr init` has created it.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::StoreNotInitialized`] when the file is missing.
    pub fn open_existing_store(&self) -> Result<Connection> {
        if !self.db_path.exists() {
            return Err(LarderError::with_detail(
                ErrorCode::StoreNotInitialized,
                self.db_path.display().to_string(),
            )
            .into());
        }
        db::open_store(&self.db_path)
    }

    /// Open the store, creating and migrating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error when opening or migrating fails.
    pub fn create_store(&self) -> Result<Connection> {
        db::open_store(&self.db_path)
    }

    /// The expiry parser configured for this installation.
    #[must_use]
    pub fn parser(&self) -> ExpiryParser {
        self.config.expiry.parser()
    }
}

/// Resolve the acting account from `--user`, falling back to the
/// `LARDER_USER` env var.
///
/// # Errors
///
/// [`ErrorCode::EmptyField`] when no identity was supplied,
/// [`ErrorCode::UserNotFound`] when the login id is unknown.
pub fn resolve_account(conn: &Connection, user_flag: Option<&str>) -> Result<User> {
    let login_id = user_flag.map(str::to_owned).or_else(|| {
        std::env::var("LARDER_USER")
            .ok()
            .filter(|value| !value.trim().is_empty())
    });

    let Some(login_id) = login_id else {
        return Err(LarderError::with_detail(
            ErrorCode::EmptyField,
            "user (pass --user or set LARDER_USER)",
        )
        .into());
    };

    users::get_by_login_id(conn, &login_id)?
        .ok_or_else(|| LarderError::with_detail(ErrorCode::UserNotFound, login_id).into())
}
