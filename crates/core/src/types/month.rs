//! Calendar month used for payroll and reporting periods.

use core::fmt;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`YearMonth`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum YearMonthError {
    /// The input is not shaped like `YYYY-MM`.
    #[error("month must look like YYYY-MM (got {0:?})")]
    Format(String),
    /// The month number is outside 1-12.
    #[error("month must be between 1 and 12 (got {0})")]
    MonthOutOfRange(u32),
}

/// A calendar month, written `YYYY-MM`.
///
/// ```
/// use shopdesk_core::YearMonth;
///
/// let month: YearMonth = "2026-02".parse().unwrap();
/// assert_eq!(month.days(), 28);
/// assert_eq!(month.to_string(), "2026-02");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a month, validating the month number.
    ///
    /// # Errors
    ///
    /// Returns `YearMonthError::MonthOutOfRange` if `month` is not 1-12.
    pub fn new(year: i32, month: u32) -> Result<Self, YearMonthError> {
        if month == 0 || month > 12 {
            return Err(YearMonthError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month number, 1-12.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Number of days in the month.
    #[must_use]
    pub fn days(self) -> u32 {
        self.last_day().day()
    }

    /// Whether `date` falls inside this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for YearMonth {
    type Err = YearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || YearMonthError::Format(s.to_owned());
        let (year, month) = s.trim().split_once('-').ok_or_else(format_err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(format_err());
        }
        let year = year.parse::<i32>().map_err(|_| format_err())?;
        let month = month.parse::<u32>().map_err(|_| format_err())?;
        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let month: YearMonth = "2026-10".parse().unwrap();
        assert_eq!(month.year(), 2026);
        assert_eq!(month.month(), 10);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(matches!(
            "2026-1".parse::<YearMonth>(),
            Err(YearMonthError::Format(_))
        ));
        assert!(matches!(
            "october".parse::<YearMonth>(),
            Err(YearMonthError::Format(_))
        ));
        assert!(matches!(
            "2026-13".parse::<YearMonth>(),
            Err(YearMonthError::MonthOutOfRange(13))
        ));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!("2024-02".parse::<YearMonth>().unwrap().days(), 29);
        assert_eq!("2026-02".parse::<YearMonth>().unwrap().days(), 28);
        assert_eq!("2026-12".parse::<YearMonth>().unwrap().days(), 31);
        assert_eq!("2026-04".parse::<YearMonth>().unwrap().days(), 30);
    }

    #[test]
    fn test_bounds_and_contains() {
        let month: YearMonth = "2026-12".parse().unwrap();
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
        assert!(month.contains(NaiveDate::from_ymd_opt(2026, 12, 15).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap()));
    }

    #[test]
    fn test_serde_as_string() {
        let month = YearMonth::new(2026, 3).unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2026-03\"");
        let parsed: YearMonth = serde_json::from_str("\"2026-03\"").unwrap();
        assert_eq!(parsed, month);
        assert!(serde_json::from_str::<YearMonth>("\"2026-3\"").is_err());
    }
}
