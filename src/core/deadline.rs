//! Deadline strategies and the deadline resolver
//!
//! A company picks one of three strategies for the monthly submission
//! deadline. [`DeadlineStrategyConfig`] is the stored (and YAML) form; it is
//! checked once at the boundary by [`DeadlineStrategyConfig::rule`], which
//! yields a [`DeadlineRule`] the calculator can evaluate without further
//! validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::calendar::{nth_working_day_from_end, nth_working_day_from_start};
use crate::core::error::{ConfigError, Result};
use crate::core::period::ReferenceMonth;

/// Day of month used when no strategy is configured
pub const DEFAULT_FIXED_DAY: u32 = 5;

/// How the monthly deadline is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeadlineStrategy {
    /// A fixed calendar day of the month
    FixedDay,
    /// The N-th working day counted from the 1st
    WorkingDaysFromStart,
    /// The N-th working day counted back from the last day
    WorkingDaysFromEnd,
    /// Unset or unrecognised; resolves as FIXED_DAY on [`DEFAULT_FIXED_DAY`]
    #[default]
    #[serde(other)]
    Unknown,
}

/// Company-level deadline configuration
///
/// Only the numeric field matching `strategy` is read; the others may be
/// stored but are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate)]
pub struct DeadlineStrategyConfig {
    #[serde(default)]
    pub strategy: DeadlineStrategy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 31))]
    pub fixed_day: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 31))]
    pub days_from_start: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 31))]
    pub days_from_end: Option<u32>,
}

/// A validated deadline rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineRule {
    FixedDay(u32),
    WorkingDaysFromStart(u32),
    WorkingDaysFromEnd(u32),
}

impl DeadlineStrategyConfig {
    pub fn fixed_day(day: u32) -> Self {
        Self {
            strategy: DeadlineStrategy::FixedDay,
            fixed_day: Some(day),
            ..Self::default()
        }
    }

    pub fn working_days_from_start(days: u32) -> Self {
        Self {
            strategy: DeadlineStrategy::WorkingDaysFromStart,
            days_from_start: Some(days),
            ..Self::default()
        }
    }

    pub fn working_days_from_end(days: u32) -> Self {
        Self {
            strategy: DeadlineStrategy::WorkingDaysFromEnd,
            days_from_end: Some(days),
            ..Self::default()
        }
    }

    /// Check the configuration and turn it into a [`DeadlineRule`]
    ///
    /// Fails with [`ConfigError::InvalidConfiguration`] when the field the
    /// strategy needs is missing or out of range.
    pub fn rule(&self) -> std::result::Result<DeadlineRule, ConfigError> {
        let (field, value) = match self.strategy {
            DeadlineStrategy::FixedDay => ("fixed_day", self.fixed_day),
            DeadlineStrategy::WorkingDaysFromStart => ("days_from_start", self.days_from_start),
            DeadlineStrategy::WorkingDaysFromEnd => ("days_from_end", self.days_from_end),
            DeadlineStrategy::Unknown => {
                tracing::debug!(
                    day = DEFAULT_FIXED_DAY,
                    "no deadline strategy configured, using fixed day default"
                );
                return Ok(DeadlineRule::FixedDay(DEFAULT_FIXED_DAY));
            }
        };

        let value = value.ok_or_else(|| {
            ConfigError::invalid(
                field,
                format!("required when strategy is {}", self.strategy.as_str()),
            )
        })?;
        self.check_range(field)?;

        Ok(match self.strategy {
            DeadlineStrategy::FixedDay => DeadlineRule::FixedDay(value),
            DeadlineStrategy::WorkingDaysFromStart => DeadlineRule::WorkingDaysFromStart(value),
            _ => DeadlineRule::WorkingDaysFromEnd(value),
        })
    }

    /// Range checks apply only to the field the strategy uses
    fn check_range(&self, active_field: &str) -> std::result::Result<(), ConfigError> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };
        if errors.field_errors().contains_key(active_field) {
            return Err(ConfigError::invalid(active_field, "must be between 1 and 31"));
        }
        Ok(())
    }
}

impl DeadlineStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadlineStrategy::FixedDay => "FIXED_DAY",
            DeadlineStrategy::WorkingDaysFromStart => "WORKING_DAYS_FROM_START",
            DeadlineStrategy::WorkingDaysFromEnd => "WORKING_DAYS_FROM_END",
            DeadlineStrategy::Unknown => "UNKNOWN",
        }
    }
}

impl DeadlineRule {
    /// The deadline date of `period` under this rule
    ///
    /// A fixed day past the end of the month is clamped to the month's last
    /// day, so a deadline never rolls over into the following month.
    pub fn deadline_for(&self, period: ReferenceMonth) -> Result<NaiveDate> {
        let date = match *self {
            DeadlineRule::FixedDay(day) => period.day(day),
            DeadlineRule::WorkingDaysFromStart(n) => {
                nth_working_day_from_start(period.year(), period.month(), n)?
            }
            DeadlineRule::WorkingDaysFromEnd(n) => {
                nth_working_day_from_end(period.year(), period.month(), n)?
            }
        };
        Ok(date)
    }
}

/// Resolve the submission deadline of `year`/`month` under `config`
pub fn resolve_deadline(config: &DeadlineStrategyConfig, year: i32, month: u32) -> Result<NaiveDate> {
    let period = ReferenceMonth::new(year, month)?;
    resolve_deadline_for(config, period)
}

/// [`resolve_deadline`] for an already-validated period
pub fn resolve_deadline_for(config: &DeadlineStrategyConfig, period: ReferenceMonth) -> Result<NaiveDate> {
    config.rule()?.deadline_for(period)
}

/// Deadlines for `count` consecutive months starting at `from`
///
/// Used to preview a strategy before a manager saves it.
pub fn preview(
    config: &DeadlineStrategyConfig,
    from: ReferenceMonth,
    count: usize,
) -> Result<Vec<(ReferenceMonth, NaiveDate)>> {
    let rule = config.rule()?;
    let mut period = from;
    let mut deadlines = Vec::with_capacity(count);
    for i in 0..count {
        if i > 0 {
            period = period.next()?;
        }
        deadlines.push((period, rule.deadline_for(period)?));
    }
    Ok(deadlines)
}
