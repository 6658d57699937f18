//! Invoice records and the invoice status machine
//!
//! ```text
//! NOT_SUBMITTED ──submit──▶ SUBMITTED ──approve──▶ APPROVED (terminal)
//!                              │   ▲
//!                       reject │   │ submit
//!                              ▼   │
//!                            REJECTED
//!
//! NOT_SUBMITTED | SUBMITTED | REJECTED ──ignore──▶ IGNORED (terminal)
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::core::error::TransitionError;
use crate::core::period::ReferenceMonth;

/// Lifecycle status of a user's invoice for one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    #[default]
    NotSubmitted,
    Submitted,
    Approved,
    Rejected,
    Ignored,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::NotSubmitted => "NOT_SUBMITTED",
            InvoiceStatus::Submitted => "SUBMITTED",
            InvoiceStatus::Approved => "APPROVED",
            InvoiceStatus::Rejected => "REJECTED",
            InvoiceStatus::Ignored => "IGNORED",
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Approved | InvoiceStatus::Ignored)
    }

    /// Whether a submission timestamp must be present in this status
    pub fn has_submission(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Submitted | InvoiceStatus::Approved | InvoiceStatus::Rejected
        )
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata recorded when a collaborator submits an invoice
///
/// The file itself is validated and stored elsewhere; only the fact of the
/// submission and its descriptive fields are tracked here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

impl Submission {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            amount: None,
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// An event applied to an invoice record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InvoiceAction {
    Submit(Submission),
    Approve,
    Reject { reason: String },
    Ignore,
}

impl InvoiceAction {
    pub fn name(&self) -> &'static str {
        match self {
            InvoiceAction::Submit(_) => "submit",
            InvoiceAction::Approve => "approve",
            InvoiceAction::Reject { .. } => "reject",
            InvoiceAction::Ignore => "ignore",
        }
    }
}

/// One user's invoice for one reference month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month: ReferenceMonth,
    pub status: InvoiceStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    /// Bumped on every committed transition; used for optimistic locking
    pub version: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceRecord {
    /// A fresh NOT_SUBMITTED record, created lazily on first use
    pub fn new(user_id: Uuid, month: ReferenceMonth, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            month,
            status: InvoiceStatus::NotSubmitted,
            submitted_at: None,
            reviewed_at: None,
            rejection_reason: None,
            file_name: None,
            amount: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply `action` in place
    ///
    /// On error the record is left untouched.
    pub fn apply(&mut self, action: InvoiceAction, now: DateTime<Utc>) -> Result<(), TransitionError> {
        let invalid = TransitionError::InvalidTransition {
            from: self.status,
            action: action.name(),
        };

        match (self.status, action) {
            (InvoiceStatus::NotSubmitted | InvoiceStatus::Rejected, InvoiceAction::Submit(submission)) => {
                if let Some(previous) = self.submitted_at {
                    if now <= previous {
                        return Err(TransitionError::NonMonotonicTimestamp {
                            previous,
                            attempted: now,
                        });
                    }
                }
                self.status = InvoiceStatus::Submitted;
                self.submitted_at = Some(now);
                self.reviewed_at = None;
                self.rejection_reason = None;
                self.file_name = submission.file_name;
                if submission.amount.is_some() {
                    self.amount = submission.amount;
                }
            }
            (InvoiceStatus::Submitted, InvoiceAction::Approve) => {
                self.status = InvoiceStatus::Approved;
                self.reviewed_at = Some(now);
            }
            (InvoiceStatus::Submitted, InvoiceAction::Reject { reason }) => {
                let reason = reason.trim();
                if reason.is_empty() {
                    return Err(TransitionError::MissingRejectionReason);
                }
                self.status = InvoiceStatus::Rejected;
                self.reviewed_at = Some(now);
                self.rejection_reason = Some(reason.to_string());
            }
            (
                InvoiceStatus::NotSubmitted | InvoiceStatus::Submitted | InvoiceStatus::Rejected,
                InvoiceAction::Ignore,
            ) => {
                self.status = InvoiceStatus::Ignored;
                self.rejection_reason = None;
            }
            _ => return Err(invalid),
        }

        self.version += 1;
        self.updated_at = now;
        Ok(())
    }

    /// Check the record-level invariants
    pub fn check_invariants(&self) -> bool {
        let submission_ok = match self.status {
            // IGNORED keeps whatever timestamps it had when it was ignored
            InvoiceStatus::Ignored => true,
            status => status.has_submission() == self.submitted_at.is_some(),
        };
        let reason_ok = self.rejection_reason.is_none() || self.status == InvoiceStatus::Rejected;
        submission_ok && reason_ok
    }
}

/// Pure form of [`InvoiceRecord::apply`]: returns the transitioned copy
pub fn transition(
    record: &InvoiceRecord,
    action: InvoiceAction,
    now: DateTime<Utc>,
) -> Result<InvoiceRecord, TransitionError> {
    let mut next = record.clone();
    next.apply(action, now)?;
    Ok(next)
}
