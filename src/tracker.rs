//! High-level entry point combining configuration, storage, clock and events

use chrono::NaiveDate;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::config::{CompanyConfig, TrackerConfig};
use crate::core::clock::{Clock, SystemClock};
use crate::core::compliance::{
    ComplianceResult, ComplianceStats, UserDelay, aggregate, evaluate_compliance, overdue,
};
use crate::core::deadline::{DeadlineStrategyConfig, resolve_deadline_for};
use crate::core::error::{Result, StorageError};
use crate::core::events::{EventBus, LifecycleEvent};
use crate::core::invoice::{InvoiceAction, InvoiceRecord, InvoiceStatus, Submission};
use crate::core::period::ReferenceMonth;
use crate::core::reminder::ReminderSchedule;
use crate::core::service::InvoiceStore;
use crate::storage::InMemoryInvoiceStore;

/// Invoice compliance tracker
///
/// Cheap to clone; clones share configuration, store and event bus.
#[derive(Clone)]
pub struct ComplianceTracker {
    config: Arc<RwLock<TrackerConfig>>,
    store: Arc<dyn InvoiceStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
}

impl ComplianceTracker {
    pub fn new(config: TrackerConfig, store: Arc<dyn InvoiceStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            clock,
            events: EventBus::default(),
        }
    }

    /// A tracker over an in-memory store reading the system clock
    pub fn in_memory(config: TrackerConfig) -> Self {
        Self::new(config, Arc::new(InMemoryInvoiceStore::new()), Arc::new(SystemClock))
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The month containing the clock's current date
    pub fn current_month(&self) -> ReferenceMonth {
        ReferenceMonth::containing(self.clock.now().date_naive())
    }

    /// Snapshot of one company's configuration
    pub fn company(&self, company_id: &Uuid) -> Result<CompanyConfig> {
        let config = self
            .config
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        Ok(config.company(company_id)?.clone())
    }

    /// Replace a company's deadline strategy
    pub fn update_deadline(&self, company_id: &Uuid, deadline: DeadlineStrategyConfig) -> Result<()> {
        let mut config = self
            .config
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        config.company_mut(company_id)?.set_deadline(deadline)?;
        tracing::info!(company_id = %company_id, "deadline strategy updated");
        Ok(())
    }

    // === Deadlines ===

    pub fn deadline_for(&self, company_id: &Uuid, month: ReferenceMonth) -> Result<NaiveDate> {
        let company = self.company(company_id)?;
        resolve_deadline_for(&company.deadline, month)
    }

    pub fn reminder_schedule(&self, company_id: &Uuid, month: ReferenceMonth) -> Result<ReminderSchedule> {
        let company = self.company(company_id)?;
        let deadline = resolve_deadline_for(&company.deadline, month)?;
        Ok(ReminderSchedule::build(&company.reminders, month, deadline))
    }

    // === Lifecycle ===

    pub async fn submit(&self, user_id: &Uuid, month: ReferenceMonth, submission: Submission) -> Result<InvoiceRecord> {
        self.transition(user_id, month, InvoiceAction::Submit(submission)).await
    }

    pub async fn approve(&self, user_id: &Uuid, month: ReferenceMonth) -> Result<InvoiceRecord> {
        self.transition(user_id, month, InvoiceAction::Approve).await
    }

    pub async fn reject(&self, user_id: &Uuid, month: ReferenceMonth, reason: impl Into<String>) -> Result<InvoiceRecord> {
        let action = InvoiceAction::Reject {
            reason: reason.into(),
        };
        self.transition(user_id, month, action).await
    }

    pub async fn ignore(&self, user_id: &Uuid, month: ReferenceMonth) -> Result<InvoiceRecord> {
        self.transition(user_id, month, InvoiceAction::Ignore).await
    }

    /// Apply `action` and publish the resulting event
    pub async fn transition(&self, user_id: &Uuid, month: ReferenceMonth, action: InvoiceAction) -> Result<InvoiceRecord> {
        let now = self.clock.now();
        let record = self.store.apply(user_id, month, action.clone(), now).await?;
        self.events
            .publish(LifecycleEvent::from_transition(&action, &record), now);
        Ok(record)
    }

    // === Compliance ===

    /// Compliance of one member for `month`, as of now
    pub async fn evaluate(&self, company_id: &Uuid, user_id: &Uuid, month: ReferenceMonth) -> Result<ComplianceResult> {
        let deadline = self.deadline_for(company_id, month)?;
        let record = self.store.get(user_id, month).await?;
        Ok(evaluate_compliance(record.as_ref(), deadline, self.clock.now()))
    }

    /// Dashboard counts for a company's members in `month`
    pub async fn stats(&self, company_id: &Uuid, month: ReferenceMonth) -> Result<ComplianceStats> {
        let company = self.company(company_id)?;
        let records = self.store.list_month(month).await?;
        Ok(aggregate(&company.members, &records, month))
    }

    /// Members late for `month`, most overdue first
    pub async fn overdue(&self, company_id: &Uuid, month: ReferenceMonth) -> Result<Vec<UserDelay>> {
        let company = self.company(company_id)?;
        let deadline = resolve_deadline_for(&company.deadline, month)?;
        let records = self.store.list_month(month).await?;
        Ok(overdue(&company.members, &records, month, deadline, self.clock.now()))
    }

    /// Members to remind today: those with nothing under review yet
    ///
    /// Empty unless today is one of the month's reminder dates.
    pub async fn reminders_due(&self, company_id: &Uuid, month: ReferenceMonth) -> Result<Vec<Uuid>> {
        let company = self.company(company_id)?;
        let schedule = self.reminder_schedule(company_id, month)?;
        if !schedule.is_due(self.clock.now().date_naive()) {
            return Ok(Vec::new());
        }

        let records = self.store.list_month(month).await?;
        Ok(company
            .members
            .iter()
            .filter(|user_id| {
                let status = records.get(*user_id).map(|r| r.status).unwrap_or_default();
                matches!(status, InvoiceStatus::NotSubmitted | InvoiceStatus::Rejected)
            })
            .copied()
            .collect())
    }
}
