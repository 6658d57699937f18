//! # invoice-compliance
//!
//! Monthly invoice-compliance tracking: collaborators submit one invoice per
//! month, managers review it, and each company decides by which day of the
//! month invoices are due.
//!
//! ## Features
//!
//! - **Deadline Strategies**: fixed day of month, or N-th working day from the start or end
//! - **Business Days**: Monday-Friday calendar arithmetic with a bounded walk
//! - **Invoice Lifecycle**: closed status machine with typed transition errors
//! - **Compliance**: on-track / late / submitted / resolved evaluation against an injected clock
//! - **Dashboards**: per-status aggregation with missing records counted as not submitted
//! - **Reminders**: reminder dates derived from the resolved deadline
//! - **Configuration-Based**: companies, strategies and members via YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use compliance::prelude::*;
//!
//! let config = TrackerConfig::from_yaml_file("tracker.yaml")?;
//! let tracker = ComplianceTracker::in_memory(config);
//!
//! let month: ReferenceMonth = "2024-02".parse()?;
//! let deadline = tracker.deadline_for(&company_id, month)?;
//!
//! tracker.submit(&user_id, month, Submission::new("february.pdf")).await?;
//! tracker.approve(&user_id, month).await?;
//!
//! let stats = tracker.stats(&company_id, month).await?;
//! println!("{} of {} approved (due {})", stats.approved, stats.total, deadline);
//! ```

pub mod config;
pub mod core;
pub mod storage;
pub mod tracker;

pub use tracker::ComplianceTracker;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Calendar & Deadlines ===
    pub use crate::core::{
        calendar::{is_working_day, nth_working_day_from_end, nth_working_day_from_start},
        deadline::{
            DeadlineRule, DeadlineStrategy, DeadlineStrategyConfig, resolve_deadline,
            resolve_deadline_for,
        },
        period::ReferenceMonth,
        reminder::{ReminderPolicy, ReminderSchedule},
    };

    // === Lifecycle & Compliance ===
    pub use crate::core::{
        compliance::{
            ComplianceResult, ComplianceStats, ComplianceStatus, UserDelay, aggregate, deadline_instant,
            evaluate_compliance, overdue,
        },
        invoice::{InvoiceAction, InvoiceRecord, InvoiceStatus, Submission, transition},
    };

    // === Errors ===
    pub use crate::core::error::{
        ConfigError, RangeError, Result, StorageError, TrackerError, TransitionError,
    };

    // === Infrastructure ===
    pub use crate::core::{
        clock::{Clock, ManualClock, SystemClock},
        events::{EventBus, EventEnvelope, LifecycleEvent},
        service::InvoiceStore,
    };
    pub use crate::storage::InMemoryInvoiceStore;

    // === Config & Facade ===
    pub use crate::config::{CompanyConfig, TrackerConfig};
    pub use crate::tracker::ComplianceTracker;

    // === External dependencies ===
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use rust_decimal::Decimal;
    pub use uuid::Uuid;
}
