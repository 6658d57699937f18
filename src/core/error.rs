//! Typed error handling for the compliance tracker
//!
//! Every fallible operation returns [`TrackerError`], which wraps one error
//! category per concern so callers can match precisely instead of parsing
//! messages.
//!
//! # Error Categories
//!
//! - [`TransitionError`]: illegal invoice lifecycle moves
//! - [`ConfigError`]: invalid deadline strategy or tracker configuration
//! - [`RangeError`]: out-of-range calendar inputs
//! - [`StorageError`]: failures reported by an [`InvoiceStore`](crate::core::InvoiceStore)
//!
//! # Example
//!
//! ```rust,ignore
//! match tracker.approve(user_id, month).await {
//!     Ok(record) => println!("approved at {:?}", record.reviewed_at),
//!     Err(TrackerError::Transition(TransitionError::InvalidTransition { from, .. })) => {
//!         println!("cannot approve an invoice that is {}", from);
//!     }
//!     Err(e) => eprintln!("{} ({})", e, e.error_code()),
//! }
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::core::invoice::InvoiceStatus;
use crate::core::period::ReferenceMonth;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, TrackerError>;

/// The main error type of the crate
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Invoice lifecycle errors
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Calendar range errors
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TrackerError {
    /// Stable code for programmatic handling by the calling layer
    pub fn error_code(&self) -> &'static str {
        match self {
            TrackerError::Transition(e) => e.error_code(),
            TrackerError::Config(e) => e.error_code(),
            TrackerError::Range(e) => e.error_code(),
            TrackerError::Storage(e) => e.error_code(),
        }
    }
}

// =============================================================================
// Transition Errors
// =============================================================================

/// Errors raised by the invoice status machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The action is not permitted from the record's current status
    #[error("cannot {action} an invoice that is {from}")]
    InvalidTransition {
        from: InvoiceStatus,
        action: &'static str,
    },

    /// A rejection must say why
    #[error("a rejection reason is required")]
    MissingRejectionReason,

    /// A resubmission must happen strictly after the previous submission
    #[error("submission time {attempted} is not after the previous submission {previous}")]
    NonMonotonicTimestamp {
        previous: DateTime<Utc>,
        attempted: DateTime<Utc>,
    },
}

impl TransitionError {
    pub fn error_code(&self) -> &'static str {
        match self {
            TransitionError::InvalidTransition { .. } => "INVALID_TRANSITION",
            TransitionError::MissingRejectionReason => "MISSING_REJECTION_REASON",
            TransitionError::NonMonotonicTimestamp { .. } => "NON_MONOTONIC_TIMESTAMP",
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors related to deadline strategies and tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A field required by the selected strategy is missing or out of range
    #[error("invalid configuration for '{field}': {message}")]
    InvalidConfiguration { field: String, message: String },

    /// Company is not part of the tracker configuration
    #[error("unknown company '{id}'")]
    UnknownCompany { id: Uuid },

    /// Configuration text could not be parsed
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidConfiguration`]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            ConfigError::UnknownCompany { .. } => "UNKNOWN_COMPANY",
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR",
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

// =============================================================================
// Range Errors
// =============================================================================

/// Errors raised by the business-day calculator and period parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Working-day ordinals start at 1
    #[error("working-day count must be at least 1 (got {n})")]
    NonPositiveCount { n: u32 },

    /// The walk exhausted the month without reaching the requested ordinal
    #[error("month {month} has no working day #{n} (walk stopped after {steps} days)")]
    IterationCapExceeded {
        month: ReferenceMonth,
        n: u32,
        steps: u32,
    },

    /// Month number outside 1..=12
    #[error("month must be between 1 and 12 (got {month})")]
    InvalidMonth { month: u32 },

    /// Year the calendar cannot represent
    #[error("year {year} is outside the supported calendar")]
    YearOutOfRange { year: i32 },

    /// Text that is not a canonical `YYYY-MM` period
    #[error("'{value}' is not a valid YYYY-MM period")]
    InvalidPeriod { value: String },
}

impl RangeError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RangeError::NonPositiveCount { .. } => "NON_POSITIVE_COUNT",
            RangeError::IterationCapExceeded { .. } => "ITERATION_CAP_EXCEEDED",
            RangeError::InvalidMonth { .. } => "INVALID_MONTH",
            RangeError::YearOutOfRange { .. } => "YEAR_OUT_OF_RANGE",
            RangeError::InvalidPeriod { .. } => "INVALID_PERIOD",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors reported by invoice stores
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Optimistic version check failed: someone else wrote the record first
    #[error("invoice {user_id}/{month} was modified concurrently (expected version {expected:?}, found {found:?})")]
    VersionConflict {
        user_id: Uuid,
        month: ReferenceMonth,
        expected: Option<u64>,
        found: Option<u64>,
    },

    /// A lock guarding the store was poisoned by a panicking writer
    #[error("storage lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::VersionConflict { .. } => "VERSION_CONFLICT",
            StorageError::LockPoisoned(_) => "STORAGE_UNAVAILABLE",
        }
    }
}
