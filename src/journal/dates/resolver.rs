//! "When did this happen" resolution.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::journal::core::errors::{JournalError, JournalResult};
use crate::journal::dates::clock::Clock;

/// Wire format of explicit dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Symbolic date choice made by the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "choice", content = "value")]
pub enum DateSelector {
    /// The caller's current local date.
    Today,
    /// One day before today.
    Yesterday,
    /// A `YYYY-MM-DD` date typed by the user, validated on resolve.
    Explicit(String),
}

impl DateSelector {
    /// Decode the radio choice and the free date field of the conversation form.
    ///
    /// Anything other than `today` or `yesterday` means the explicit field is used.
    #[must_use]
    pub fn from_form(choice: Option<&str>, explicit: Option<&str>) -> Self {
        match choice.map(str::trim) {
            Some("today") => Self::Today,
            Some("yesterday") => Self::Yesterday,
            _ => Self::Explicit(explicit.unwrap_or_default().to_string()),
        }
    }
}

/// Turns a [`DateSelector`] into a calendar date.
#[derive(Clone)]
pub struct DateResolver {
    clock: Arc<dyn Clock>,
}

impl DateResolver {
    /// Resolver reading "today" from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Resolve the selector.
    ///
    /// # Errors
    /// Returns [`JournalError::InvalidDate`] if an explicit value is not a real
    /// calendar date.
    pub fn resolve(&self, selector: &DateSelector) -> JournalResult<NaiveDate> {
        match selector {
            DateSelector::Today => Ok(self.clock.today()),
            DateSelector::Yesterday => self
                .clock
                .today()
                .pred_opt()
                .ok_or_else(|| JournalError::InvalidDate("no day before today".to_string())),
            DateSelector::Explicit(raw) => parse_date(raw),
        }
    }
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
/// Returns [`JournalError::InvalidDate`] on malformed input or impossible dates.
pub fn parse_date(raw: &str) -> JournalResult<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|err| JournalError::InvalidDate(format!("{trimmed:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::dates::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn resolver() -> DateResolver {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        DateResolver::new(Arc::new(FixedClock::at(now)))
    }

    #[test]
    fn today_is_the_clock_date() {
        let date = resolver().resolve(&DateSelector::Today).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn yesterday_crosses_month_and_leap_day() {
        let date = resolver().resolve(&DateSelector::Yesterday).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn explicit_date_is_parsed() {
        let selector = DateSelector::Explicit(" 2024-01-10 ".to_string());
        let date = resolver().resolve(&selector).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn impossible_date_is_invalid() {
        let selector = DateSelector::Explicit("2024-02-30".to_string());
        let err = resolver().resolve(&selector).unwrap_err();
        assert!(matches!(err, JournalError::InvalidDate(_)));
    }

    #[test]
    fn empty_explicit_date_is_invalid() {
        let selector = DateSelector::from_form(Some("other"), None);
        assert!(resolver().resolve(&selector).is_err());
    }

    #[test]
    fn form_choices_map_to_variants() {
        assert_eq!(
            DateSelector::from_form(Some("today"), Some("2020-01-01")),
            DateSelector::Today
        );
        assert_eq!(
            DateSelector::from_form(Some("yesterday"), None),
            DateSelector::Yesterday
        );
        assert_eq!(
            DateSelector::from_form(None, Some("2020-01-01")),
            DateSelector::Explicit("2020-01-01".to_string())
        );
    }
}
