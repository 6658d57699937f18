//! Compliance evaluation and dashboard aggregation
//!
//! The deadline falls at the start of its day (00:00 UTC). Lateness and the
//! time remaining are whole days rounded up, so any part of a day counts as a
//! full one. Results are derived on demand from the caller-supplied `now` and
//! never cached.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::invoice::{InvoiceRecord, InvoiceStatus};
use crate::core::period::ReferenceMonth;

/// Where a user-month stands relative to its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// Not submitted yet, deadline not passed
    OnTrack { days_remaining: u32 },

    /// Not submitted and the deadline has passed
    Late { days_late: u32 },

    /// Submitted and awaiting review. `days_before_deadline` counts whole days
    /// between submission and deadline, rounded up, and is negative when the
    /// submission came after the deadline; it is informational only.
    Submitted { days_before_deadline: i64, on_time: bool },

    /// Approved, rejected or ignored: nothing pending, no delay reported
    Resolved { status: InvoiceStatus },
}

/// Compliance of one user-month at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub deadline: NaiveDate,
    #[serde(flatten)]
    pub status: ComplianceStatus,
}

impl ComplianceResult {
    pub fn is_late(&self) -> bool {
        matches!(self.status, ComplianceStatus::Late { .. })
    }

    pub fn days_late(&self) -> Option<u32> {
        match self.status {
            ComplianceStatus::Late { days_late } => Some(days_late),
            _ => None,
        }
    }

    pub fn days_remaining(&self) -> Option<u32> {
        match self.status {
            ComplianceStatus::OnTrack { days_remaining } => Some(days_remaining),
            _ => None,
        }
    }
}

/// Evaluate a record (or its absence) against a resolved deadline
///
/// A missing record is treated as NOT_SUBMITTED.
pub fn evaluate_compliance(
    record: Option<&InvoiceRecord>,
    deadline: NaiveDate,
    now: DateTime<Utc>,
) -> ComplianceResult {
    let status = record.map(|r| r.status).unwrap_or_default();
    let due_at = deadline_instant(deadline);

    let status = match status {
        InvoiceStatus::NotSubmitted if now > due_at => ComplianceStatus::Late {
            days_late: ceil_days(now - due_at),
        },
        InvoiceStatus::NotSubmitted => ComplianceStatus::OnTrack {
            days_remaining: ceil_days(due_at - now),
        },
        InvoiceStatus::Submitted => {
            let submitted_at = record.and_then(|r| r.submitted_at).unwrap_or(now);
            let on_time = submitted_at <= due_at;
            let days_before_deadline = if on_time {
                i64::from(ceil_days(due_at - submitted_at))
            } else {
                -i64::from(ceil_days(submitted_at - due_at))
            };
            ComplianceStatus::Submitted {
                days_before_deadline,
                on_time,
            }
        }
        status => ComplianceStatus::Resolved { status },
    };

    ComplianceResult { deadline, status }
}

/// The instant a deadline date is reached
pub fn deadline_instant(deadline: NaiveDate) -> DateTime<Utc> {
    deadline.and_time(NaiveTime::MIN).and_utc()
}

/// Round a non-negative span up to whole days
fn ceil_days(span: Duration) -> u32 {
    let whole = span.num_days();
    let days = if span > Duration::days(whole) { whole + 1 } else { whole };
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Per-status counts for one company and month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceStats {
    pub total: usize,
    /// Submitted and awaiting review
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub not_submitted: usize,
    pub ignored: usize,
}

impl ComplianceStats {
    fn count(&mut self, status: InvoiceStatus) {
        self.total += 1;
        match status {
            InvoiceStatus::NotSubmitted => self.not_submitted += 1,
            InvoiceStatus::Submitted => self.pending += 1,
            InvoiceStatus::Approved => self.approved += 1,
            InvoiceStatus::Rejected => self.rejected += 1,
            InvoiceStatus::Ignored => self.ignored += 1,
        }
    }
}

/// Count the statuses of `members` for `month`
///
/// Members without a record for `month` count as NOT_SUBMITTED; records
/// belonging to other months are disregarded.
pub fn aggregate<'a>(
    members: impl IntoIterator<Item = &'a Uuid>,
    records: &HashMap<Uuid, InvoiceRecord>,
    month: ReferenceMonth,
) -> ComplianceStats {
    let mut stats = ComplianceStats::default();
    for user_id in members {
        stats.count(status_for(records, user_id, month));
    }
    stats
}

/// A member who is late for the month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDelay {
    pub user_id: Uuid,
    pub days_late: u32,
}

/// Members still NOT_SUBMITTED after the deadline, most overdue first
pub fn overdue<'a>(
    members: impl IntoIterator<Item = &'a Uuid>,
    records: &HashMap<Uuid, InvoiceRecord>,
    month: ReferenceMonth,
    deadline: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<UserDelay> {
    let mut delays: Vec<UserDelay> = members
        .into_iter()
        .filter_map(|user_id| {
            let record = records.get(user_id).filter(|r| r.month == month);
            evaluate_compliance(record, deadline, now)
                .days_late()
                .map(|days_late| UserDelay {
                    user_id: *user_id,
                    days_late,
                })
        })
        .collect();
    delays.sort_by(|a, b| b.days_late.cmp(&a.days_late).then(a.user_id.cmp(&b.user_id)));
    delays
}

fn status_for(
    records: &HashMap<Uuid, InvoiceRecord>,
    user_id: &Uuid,
    month: ReferenceMonth,
) -> InvoiceStatus {
    records
        .get(user_id)
        .filter(|r| r.month == month)
        .map(|r| r.status)
        .unwrap_or_default()
}
