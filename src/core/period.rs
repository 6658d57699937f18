//! Reference months: the `YYYY-MM` periods invoices are tracked against

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::core::error::RangeError;

static PERIOD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("period pattern is valid"));

/// A calendar month identified by year and month number (1-12)
///
/// Always rendered canonically as `YYYY-MM` and serialized as that string.
/// Ordering is chronological. Only months whose every day is representable
/// as a `NaiveDate` can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceMonth {
    first: NaiveDate,
}

impl ReferenceMonth {
    /// Create a reference month, rejecting month numbers outside 1..=12 and
    /// years outside the supported calendar
    pub fn new(year: i32, month: u32) -> Result<Self, RangeError> {
        if !(1..=12).contains(&month) {
            return Err(RangeError::InvalidMonth { month });
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(RangeError::YearOutOfRange { year })?;
        Ok(Self { first })
    }

    /// The month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.day(31)
    }

    pub fn days_in_month(&self) -> u32 {
        (29..=31)
            .rev()
            .find(|day| self.first.with_day(*day).is_some())
            .unwrap_or(28)
    }

    /// Day `day` of this month, clamped into the month's valid range
    pub fn day(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        self.first + Days::new(u64::from(day - 1))
    }

    /// The following month
    pub fn next(&self) -> Result<Self, RangeError> {
        match self.month() {
            12 => Self::new(self.year().saturating_add(1), 1),
            month => Self::new(self.year(), month + 1),
        }
    }

    /// The preceding month
    pub fn previous(&self) -> Result<Self, RangeError> {
        match self.month() {
            1 => Self::new(self.year().saturating_sub(1), 12),
            month => Self::new(self.year(), month - 1),
        }
    }

    /// Whether `date` falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl fmt::Display for ReferenceMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for ReferenceMonth {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RangeError::InvalidPeriod {
            value: s.to_string(),
        };
        let captures = PERIOD_PATTERN.captures(s.trim()).ok_or_else(invalid)?;
        let year = captures[1].parse::<i32>().map_err(|_| invalid())?;
        let month = captures[2].parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for ReferenceMonth {
    type Error = RangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReferenceMonth> for String {
    fn from(month: ReferenceMonth) -> Self {
        month.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> ReferenceMonth {
        ReferenceMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_rejects_invalid_month() {
        assert_eq!(
            ReferenceMonth::new(2024, 0),
            Err(RangeError::InvalidMonth { month: 0 })
        );
        assert!(ReferenceMonth::new(2024, 13).is_err());
    }

    #[test]
    fn test_canonical_text() {
        assert_eq!(ym(2024, 3).to_string(), "2024-03");
        assert_eq!("2023-11".parse::<ReferenceMonth>().unwrap(), ym(2023, 11));
        assert!("2023-1".parse::<ReferenceMonth>().is_err());
        assert!("2023-13".parse::<ReferenceMonth>().is_err());
        assert!("march".parse::<ReferenceMonth>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let json = serde_json::to_string(&ym(2024, 2)).unwrap();
        assert_eq!(json, "\"2024-02\"");
        let parsed: ReferenceMonth = serde_json::from_str("\"2024-12\"").unwrap();
        assert_eq!(parsed, ym(2024, 12));
        assert!(serde_json::from_str::<ReferenceMonth>("\"2024-00\"").is_err());
    }

    #[test]
    fn test_month_boundaries() {
        assert_eq!(ym(2024, 2).last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(ym(2023, 2).days_in_month(), 28);
        assert_eq!(ym(2023, 12).last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(ym(2024, 4).day(31), NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        assert_eq!(ym(2024, 4).day(0), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    }

    #[test]
    fn test_navigation_wraps_years() {
        assert_eq!(ym(2023, 12).next().unwrap(), ym(2024, 1));
        assert_eq!(ym(2024, 1).previous().unwrap(), ym(2023, 12));
        assert!(ym(2023, 12) < ym(2024, 1));
    }

    #[test]
    fn test_years_outside_calendar_are_rejected() {
        assert_eq!(
            ReferenceMonth::new(300_000, 1),
            Err(RangeError::YearOutOfRange { year: 300_000 })
        );
        assert!(ReferenceMonth::new(i32::MAX, 12).is_err());
        assert!(ReferenceMonth::new(i32::MIN, 1).is_err());
    }

    #[test]
    fn test_navigation_stops_at_calendar_edges() {
        let last = ReferenceMonth::containing(NaiveDate::MAX);
        assert_eq!(last.last_day(), NaiveDate::MAX);
        assert!(matches!(last.next(), Err(RangeError::YearOutOfRange { .. })));
        assert_eq!(last.previous().unwrap().next().unwrap(), last);

        let first = ReferenceMonth::containing(NaiveDate::MIN);
        assert_eq!(first.first_day(), NaiveDate::MIN);
        assert!(first.previous().is_err());
    }

    #[test]
    fn test_containing() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 19).unwrap();
        assert_eq!(ReferenceMonth::containing(date), ym(2024, 7));
        assert!(ym(2024, 7).contains(date));
        assert!(!ym(2024, 8).contains(date));
    }
}
