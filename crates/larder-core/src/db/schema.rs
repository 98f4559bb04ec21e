//! Canonical SQLite schema for the inventory store.
//!
//! The schema is normalized around three aggregates:
//! - `users` holds accounts, the notification preference, and the single
//!   registered push token
//! - `categories` is the lazily grown taxonomy; `(major_name, sub_name)` is
//!   the natural key, unique at the storage layer so concurrent resolves
//!   cannot mint duplicates
//! - `items` is the inventory proper; the reconciler keeps at most one row
//!   per `(user_id, item_name, category_id)`; that key is deliberately NOT
//!   a storage constraint, only indexed for lookup
//! - `store_meta` tracks schema bookkeeping

/// Migration v1: core tables plus store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    login_id TEXT NOT NULL UNIQUE CHECK (length(trim(login_id)) > 0),
    username TEXT NOT NULL UNIQUE CHECK (length(trim(username)) > 0),
    password_hash TEXT NOT NULL,
    notification INTEGER NOT NULL DEFAULT 1 CHECK (notification IN (0, 1)),
    push_token TEXT
);

CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    major_name TEXT NOT NULL CHECK (length(trim(major_name)) > 0),
    sub_name TEXT NOT NULL CHECK (length(trim(sub_name)) > 0),
    UNIQUE (major_name, sub_name)
);

CREATE TABLE IF NOT EXISTS items (
    item_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL REFERENCES categories(category_id) ON DELETE CASCADE,
    item_name TEXT NOT NULL CHECK (length(trim(item_name)) > 0),
    expiry_date TEXT,
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 1);
";

/// Migration v2: read-path indexes and the notification dedup log.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_items_user_created
    ON items(user_id, created_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_items_dedup_key
    ON items(user_id, item_name, category_id);

CREATE INDEX IF NOT EXISTS idx_items_expiry
    ON items(expiry_date);

CREATE TABLE IF NOT EXISTS notification_log (
    item_id INTEGER NOT NULL REFERENCES items(item_id) ON DELETE CASCADE,
    lead_days INTEGER NOT NULL,
    notified_on TEXT NOT NULL,
    PRIMARY KEY (item_id, lead_days, notified_on)
);

UPDATE store_meta SET schema_version = 2 WHERE id = 1;
";

/// Indexes expected by list/reconcile/scan query paths.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_items_user_created",
    "idx_items_dedup_key",
    "idx_items_expiry",
];
