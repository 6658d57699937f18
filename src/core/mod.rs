//! Core module containing the deadline, lifecycle and compliance logic

pub mod calendar;
pub mod clock;
pub mod compliance;
pub mod deadline;
pub mod error;
pub mod events;
pub mod invoice;
pub mod period;
pub mod reminder;
pub mod service;

pub use calendar::{is_working_day, nth_working_day_from_end, nth_working_day_from_start};
pub use clock::{Clock, ManualClock, SystemClock};
pub use compliance::{
    ComplianceResult, ComplianceStats, ComplianceStatus, UserDelay, aggregate, deadline_instant,
    evaluate_compliance,
};
pub use deadline::{DeadlineRule, DeadlineStrategy, DeadlineStrategyConfig, resolve_deadline};
pub use error::{ConfigError, RangeError, Result, StorageError, TrackerError, TransitionError};
pub use events::{EventBus, EventEnvelope, LifecycleEvent};
pub use invoice::{InvoiceAction, InvoiceRecord, InvoiceStatus, Submission, transition};
pub use period::ReferenceMonth;
pub use reminder::{ReminderPolicy, ReminderSchedule};
pub use service::InvoiceStore;
