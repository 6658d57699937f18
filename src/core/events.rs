//! Invoice lifecycle notifications
//!
//! The tracker publishes one [`LifecycleEvent`] per committed transition.
//! Delivery concerns (email, chat, dashboards) subscribe to the bus and stay
//! outside this crate.
//!
//! ```text
//! ComplianceTracker::submit/approve/... ──▶ EventBus::publish() ──▶ broadcast ──▶ mailers
//!                                                                             ──▶ dashboards
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let bus = EventBus::new(256);
//! let mut rx = bus.subscribe();
//!
//! if let Ok(envelope) = rx.recv().await {
//!     if let LifecycleEvent::Rejected { user_id, reason, .. } = envelope.event {
//!         notify_collaborator(user_id, &reason).await;
//!     }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::core::invoice::{InvoiceAction, InvoiceRecord};
use crate::core::period::ReferenceMonth;

/// A committed invoice transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LifecycleEvent {
    Submitted {
        user_id: Uuid,
        month: ReferenceMonth,
        file_name: Option<String>,
    },
    Approved {
        user_id: Uuid,
        month: ReferenceMonth,
    },
    Rejected {
        user_id: Uuid,
        month: ReferenceMonth,
        reason: String,
    },
    Ignored {
        user_id: Uuid,
        month: ReferenceMonth,
    },
}

impl LifecycleEvent {
    /// Describe the transition that produced `record`
    pub fn from_transition(action: &InvoiceAction, record: &InvoiceRecord) -> Self {
        let user_id = record.user_id;
        let month = record.month;
        match action {
            InvoiceAction::Submit(_) => LifecycleEvent::Submitted {
                user_id,
                month,
                file_name: record.file_name.clone(),
            },
            InvoiceAction::Approve => LifecycleEvent::Approved { user_id, month },
            InvoiceAction::Reject { .. } => LifecycleEvent::Rejected {
                user_id,
                month,
                reason: record.rejection_reason.clone().unwrap_or_default(),
            },
            InvoiceAction::Ignore => LifecycleEvent::Ignored { user_id, month },
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            LifecycleEvent::Submitted { user_id, .. }
            | LifecycleEvent::Approved { user_id, .. }
            | LifecycleEvent::Rejected { user_id, .. }
            | LifecycleEvent::Ignored { user_id, .. } => *user_id,
        }
    }

    pub fn month(&self) -> ReferenceMonth {
        match self {
            LifecycleEvent::Submitted { month, .. }
            | LifecycleEvent::Approved { month, .. }
            | LifecycleEvent::Rejected { month, .. }
            | LifecycleEvent::Ignored { month, .. } => *month,
        }
    }

    /// Get the action name (submitted, approved, rejected, ignored)
    pub fn action(&self) -> &str {
        match self {
            LifecycleEvent::Submitted { .. } => "submitted",
            LifecycleEvent::Approved { .. } => "approved",
            LifecycleEvent::Rejected { .. } => "rejected",
            LifecycleEvent::Ignored { .. } => "ignored",
        }
    }
}

/// Envelope wrapping a lifecycle event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
    pub event: LifecycleEvent,
}

impl EventEnvelope {
    pub fn new(event: LifecycleEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; all clones share the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per slow receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. Returns the number of receivers that will see the event.
    pub fn publish(&self, event: LifecycleEvent, timestamp: DateTime<Utc>) -> usize {
        let envelope = EventEnvelope::new(event, timestamp);
        // send() only errors when nobody is listening
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Receive all events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::invoice::Submission;

    fn month() -> ReferenceMonth {
        ReferenceMonth::new(2024, 9).unwrap()
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = LifecycleEvent::Rejected {
            user_id: Uuid::nil(),
            month: month(),
            reason: "wrong VAT".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "rejected");
        assert_eq!(json["month"], "2024-09");
        assert_eq!(json["reason"], "wrong VAT");
    }

    #[test]
    fn test_from_transition_reads_committed_record() {
        let now = Utc::now();
        let mut record = InvoiceRecord::new(Uuid::new_v4(), month(), now);
        let action = InvoiceAction::Submit(Submission::new("sept.pdf"));
        record.apply(action.clone(), now).unwrap();

        let event = LifecycleEvent::from_transition(&action, &record);
        assert_eq!(event.action(), "submitted");
        assert_eq!(event.user_id(), record.user_id);
        assert_eq!(event.month(), month());
        assert!(matches!(
            event,
            LifecycleEvent::Submitted { file_name: Some(ref f), .. } if f == "sept.pdf"
        ));
    }

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let receivers = bus.publish(LifecycleEvent::Approved { user_id, month: month() }, now);
        assert_eq!(receivers, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event.user_id(), user_id);
        assert_eq!(received.timestamp, now);
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.clone().subscribe();
        assert_eq!(bus.receiver_count(), 2);

        bus.publish(
            LifecycleEvent::Ignored {
                user_id: Uuid::new_v4(),
                month: month(),
            },
            Utc::now(),
        );

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.id, e2.id);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        let receivers = bus.publish(
            LifecycleEvent::Approved {
                user_id: Uuid::new_v4(),
                month: month(),
            },
            Utc::now(),
        );
        assert_eq!(receivers, 0);
    }
}
