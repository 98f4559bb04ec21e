//! Shelf-life text parsing.
//!
//! Classifier output and user edits arrive as free text ("30일", "무기한",
//! or a literal `YYYY-MM-DD` from a manual date picker). The grammar, checked
//! in order:
//!
//! 1. exact `YYYY-MM-DD` → that calendar date (manual override wins)
//! 2. the configured indefinite marker → [`Expiry::Indefinite`]
//! 3. anything else → every digit character, read as one number, counted in
//!    the configured unit from today; no digits means zero
//!
//! Rule 3 is deliberately permissive: noisy OCR text degrades to "expires
//! today" rather than an error.

use chrono::{Days, Local, NaiveDate};
use serde::Deserialize;

/// Default sentinel meaning "no expiry" in classifier output.
pub const DEFAULT_INDEFINITE_MARKER: &str = "무기한";

/// A parsed shelf-life value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Expires on this calendar date.
    On(NaiveDate),
    /// No meaningful expiry date; never flagged by the scan.
    Indefinite,
}

impl Expiry {
    /// The concrete date, if any.
    #[must_use]
    pub const fn date(self) -> Option<NaiveDate> {
        match self {
            Self::On(date) => Some(date),
            Self::Indefinite => None,
        }
    }
}

/// Unit applied to the extracted digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShelfLifeUnit {
    #[default]
    Days,
    Weeks,
}

impl ShelfLifeUnit {
    const fn day_factor(self) -> u64 {
        match self {
            Self::Days => 1,
            Self::Weeks => 7,
        }
    }
}

/// Converts free-text shelf-life descriptions into [`Expiry`] values.
#[derive(Debug, Clone)]
pub struct ExpiryParser {
    indefinite_marker: String,
    unit: ShelfLifeUnit,
}

impl Default for ExpiryParser {
    fn default() -> Self {
        Self {
            indefinite_marker: DEFAULT_INDEFINITE_MARKER.to_string(),
            unit: ShelfLifeUnit::Days,
        }
    }
}

impl ExpiryParser {
    #[must_use]
    pub fn new(indefinite_marker: impl Into<String>, unit: ShelfLifeUnit) -> Self {
        Self {
            indefinite_marker: indefinite_marker.into(),
            unit,
        }
    }

    /// Parse `text` against the given `today` (date-level resolution only).
    #[must_use]
    pub fn parse(&self, text: &str, today: NaiveDate) -> Expiry {
        if let Some(date) = parse_literal_date(text) {
            return Expiry::On(date);
        }

        if text == self.indefinite_marker {
            return Expiry::Indefinite;
        }

        let digits: String = text.chars().filter(char::is_ascii_digit).collect();
        let count: u64 = digits.parse().unwrap_or(0);
        let days = count.saturating_mul(self.unit.day_factor());
        let date = today
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX);
        Expiry::On(date)
    }

    /// Parse against the server's local civil date, evaluated now.
    #[must_use]
    pub fn parse_today(&self, text: &str) -> Expiry {
        self.parse(text, Local::now().date_naive())
    }
}

/// Accept only the exact `YYYY-MM-DD` shape; anything looser falls through
/// to digit extraction.
fn parse_literal_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}
