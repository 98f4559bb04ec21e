use serde::Serialize;

/// A taxonomy leaf identified by the `(major_name, sub_name)` natural key.
///
/// Rows are created lazily the first time a pair is seen and never deleted
/// by application logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub category_id: i64,
    pub major_name: String,
    pub sub_name: String,
}

impl Category {
    /// Render as `major > sub` for listings.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{} > {}", self.major_name, self.sub_name)
    }
}
