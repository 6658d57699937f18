//! Reminder dates derived from a resolved deadline

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::calendar::previous_working_day;
use crate::core::period::ReferenceMonth;

fn default_offsets() -> Vec<u32> {
    vec![3, 1, 0]
}

fn default_working_days_only() -> bool {
    true
}

/// When to remind collaborators, in days before the deadline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPolicy {
    #[serde(default = "default_offsets")]
    pub offsets_days: Vec<u32>,

    /// Move reminders that land on a weekend back to the preceding Friday
    #[serde(default = "default_working_days_only")]
    pub working_days_only: bool,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            offsets_days: default_offsets(),
            working_days_only: default_working_days_only(),
        }
    }
}

/// Reminder dates for one month, ascending and without duplicates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSchedule {
    pub month: ReferenceMonth,
    pub deadline: NaiveDate,
    pub reminders: Vec<NaiveDate>,
}

impl ReminderSchedule {
    pub fn build(policy: &ReminderPolicy, month: ReferenceMonth, deadline: NaiveDate) -> Self {
        let mut reminders: Vec<NaiveDate> = policy
            .offsets_days
            .iter()
            .filter_map(|offset| deadline.checked_sub_signed(Duration::days(i64::from(*offset))))
            .map(|date| {
                if policy.working_days_only {
                    previous_working_day(date)
                } else {
                    date
                }
            })
            .collect();
        reminders.sort();
        reminders.dedup();

        Self {
            month,
            deadline,
            reminders,
        }
    }

    /// Whether a reminder fires on `date`
    pub fn is_due(&self, date: NaiveDate) -> bool {
        self.reminders.binary_search(&date).is_ok()
    }

    /// First reminder on or after `date`
    pub fn next_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.reminders.iter().copied().find(|r| *r >= date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month() -> ReferenceMonth {
        ReferenceMonth::new(2024, 6).unwrap()
    }

    #[test]
    fn test_default_offsets() {
        // 2024-06-12 is a Wednesday
        let schedule = ReminderSchedule::build(&ReminderPolicy::default(), month(), date(2024, 6, 12));
        assert_eq!(
            schedule.reminders,
            vec![date(2024, 6, 7), date(2024, 6, 11), date(2024, 6, 12)]
        );
    }

    #[test]
    fn test_weekend_reminders_move_to_friday_and_dedup() {
        // Deadline Monday 2024-06-10: -1 => Sunday, -2 => Saturday, both Friday the 7th
        let policy = ReminderPolicy {
            offsets_days: vec![2, 1, 0],
            working_days_only: true,
        };
        let schedule = ReminderSchedule::build(&policy, month(), date(2024, 6, 10));
        assert_eq!(schedule.reminders, vec![date(2024, 6, 7), date(2024, 6, 10)]);
    }

    #[test]
    fn test_calendar_days_when_weekends_allowed() {
        let policy = ReminderPolicy {
            offsets_days: vec![1],
            working_days_only: false,
        };
        let schedule = ReminderSchedule::build(&policy, month(), date(2024, 6, 10));
        assert_eq!(schedule.reminders, vec![date(2024, 6, 9)]);
    }

    #[test]
    fn test_due_and_next() {
        let schedule = ReminderSchedule::build(&ReminderPolicy::default(), month(), date(2024, 6, 12));
        assert!(schedule.is_due(date(2024, 6, 11)));
        assert!(!schedule.is_due(date(2024, 6, 10)));
        assert_eq!(schedule.next_after(date(2024, 6, 8)), Some(date(2024, 6, 11)));
        assert_eq!(schedule.next_after(date(2024, 6, 13)), None);
    }

    #[test]
    fn test_policy_yaml_defaults() {
        let policy: ReminderPolicy = serde_yaml::from_str("offsets_days: [5]").unwrap();
        assert_eq!(policy.offsets_days, vec![5]);
        assert!(policy.working_days_only);
    }
}
