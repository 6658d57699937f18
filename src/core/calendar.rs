//! Business-day arithmetic
//!
//! Working days are Monday through Friday. No holiday calendar is applied.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::core::error::RangeError;
use crate::core::period::ReferenceMonth;

/// Upper bound on the number of days walked while searching a month
pub const MAX_WALK_DAYS: u32 = 31;

/// True iff `date` falls on Monday-Friday
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The `n`-th working day of the month, counting forward from the 1st
///
/// `n == 1` is the first working day of the month.
pub fn nth_working_day_from_start(year: i32, month: u32, n: u32) -> Result<NaiveDate, RangeError> {
    let period = ReferenceMonth::new(year, month)?;
    walk(period, n, Direction::Forward)
}

/// The `n`-th working day of the month, counting backward from the last day
///
/// `n == 1` is the last working day of the month.
pub fn nth_working_day_from_end(year: i32, month: u32, n: u32) -> Result<NaiveDate, RangeError> {
    let period = ReferenceMonth::new(year, month)?;
    walk(period, n, Direction::Backward)
}

/// Number of working days in a month
pub fn working_days_in_month(period: ReferenceMonth) -> u32 {
    (1..=period.days_in_month())
        .filter(|day| is_working_day(period.day(*day)))
        .count() as u32
}

/// The closest working day on or before `date`
pub fn previous_working_day(date: NaiveDate) -> NaiveDate {
    let mut current = date;
    while !is_working_day(current) {
        match current.pred_opt() {
            Some(prev) => current = prev,
            None => break,
        }
    }
    current
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

fn walk(period: ReferenceMonth, n: u32, direction: Direction) -> Result<NaiveDate, RangeError> {
    if n == 0 {
        return Err(RangeError::NonPositiveCount { n });
    }

    let mut current = match direction {
        Direction::Forward => period.first_day(),
        Direction::Backward => period.last_day(),
    };
    let mut counter = 0;
    let mut steps = 0;

    // Stay inside the month and never exceed the hard cap
    while steps < MAX_WALK_DAYS && period.contains(current) {
        steps += 1;
        if is_working_day(current) {
            counter += 1;
            if counter == n {
                return Ok(current);
            }
        }
        let next = match direction {
            Direction::Forward => current.succ_opt(),
            Direction::Backward => current.pred_opt(),
        };
        match next {
            Some(date) => current = date,
            None => break,
        }
    }

    Err(RangeError::IterationCapExceeded {
        month: period,
        n,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekends_are_not_working_days() {
        assert!(is_working_day(date(2024, 1, 5))); // Friday
        assert!(!is_working_day(date(2024, 1, 6)));
        assert!(!is_working_day(date(2024, 1, 7)));
        assert!(is_working_day(date(2024, 1, 8))); // Monday
    }

    #[test]
    fn test_first_working_day_skips_weekend() {
        // 2023-01-01 is a Sunday
        assert_eq!(nth_working_day_from_start(2023, 1, 1).unwrap(), date(2023, 1, 2));
        assert_eq!(nth_working_day_from_start(2023, 1, 5).unwrap(), date(2023, 1, 6));
        assert_eq!(nth_working_day_from_start(2023, 1, 6).unwrap(), date(2023, 1, 9));
    }

    #[test]
    fn test_last_working_day_skips_weekend() {
        // 2024-03-31 is a Sunday
        assert_eq!(nth_working_day_from_end(2024, 3, 1).unwrap(), date(2024, 3, 29));
        assert_eq!(nth_working_day_from_end(2024, 3, 2).unwrap(), date(2024, 3, 28));
        // 2024-02-29 is a Thursday
        assert_eq!(nth_working_day_from_end(2024, 2, 1).unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn test_zero_is_rejected() {
        assert_eq!(
            nth_working_day_from_start(2024, 1, 0),
            Err(RangeError::NonPositiveCount { n: 0 })
        );
        assert!(nth_working_day_from_end(2024, 1, 0).is_err());
    }

    #[test]
    fn test_ordinal_beyond_month_fails_instead_of_looping() {
        // January 2024 has 23 working days
        assert_eq!(working_days_in_month(ReferenceMonth::new(2024, 1).unwrap()), 23);
        assert!(nth_working_day_from_start(2024, 1, 23).is_ok());
        let err = nth_working_day_from_start(2024, 1, 24).unwrap_err();
        assert!(matches!(err, RangeError::IterationCapExceeded { n: 24, steps: 31, .. }));
        assert!(nth_working_day_from_end(2024, 2, 400).is_err());
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        assert_eq!(
            nth_working_day_from_start(2024, 13, 1),
            Err(RangeError::InvalidMonth { month: 13 })
        );
    }

    #[test]
    fn test_previous_working_day() {
        assert_eq!(previous_working_day(date(2024, 6, 9)), date(2024, 6, 7));
        assert_eq!(previous_working_day(date(2024, 6, 10)), date(2024, 6, 10));
    }

    #[test]
    fn test_extreme_years_do_not_panic() {
        assert_eq!(
            nth_working_day_from_end(i32::MAX, 12, 1),
            Err(RangeError::YearOutOfRange { year: i32::MAX })
        );
        assert!(nth_working_day_from_start(i32::MIN, 1, 1).is_err());
    }
}
