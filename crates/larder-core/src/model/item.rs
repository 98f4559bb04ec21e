use super::Category;
use chrono::NaiveDate;
use serde::Serialize;

/// A persisted inventory row with its resolved category attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub item_id: i64,
    pub user_id: i64,
    pub item_name: String,
    /// `None` means indefinite shelf life: never flagged as expiring.
    pub expiry_date: Option<NaiveDate>,
    /// Creation / last-reconciled timestamp, microseconds since the epoch.
    pub created_at_us: i64,
    pub category: Category,
}

/// One incoming item descriptor for the reconciler.
///
/// The `(item_name, major_name, sub_name)` part forms the dedup key once the
/// category is resolved; expiry is either the verbatim `expiry_override`
/// (manual edits always win) or derived from `expiry_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub item_name: String,
    pub major_name: String,
    pub sub_name: String,
    pub expiry_text: String,
    pub expiry_override: Option<NaiveDate>,
}

impl ItemDraft {
    #[must_use]
    pub fn new(
        item_name: impl Into<String>,
        major_name: impl Into<String>,
        sub_name: impl Into<String>,
        expiry_text: impl Into<String>,
    ) -> Self {
        Self {
            item_name: item_name.into(),
            major_name: major_name.into(),
            sub_name: sub_name.into(),
            expiry_text: expiry_text.into(),
            expiry_override: None,
        }
    }

    #[must_use]
    pub const fn with_expiry_date(mut self, date: NaiveDate) -> Self {
        self.expiry_override = Some(date);
        self
    }
}
