//! Storage seam for invoice records

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::invoice::{InvoiceAction, InvoiceRecord};
use crate::core::period::ReferenceMonth;

/// Persistence for invoice records, one per (user, month)
///
/// Implementations must serialize writes per key: two concurrent
/// [`apply`](InvoiceStore::apply) calls on the same record may not both
/// succeed from the same starting state. Reads return whole records, never
/// a mix of pre- and post-transition fields.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Get the record for a user-month, if one was ever created
    async fn get(&self, user_id: &Uuid, month: ReferenceMonth) -> Result<Option<InvoiceRecord>>;

    /// All records of a month, keyed by user
    async fn list_month(&self, month: ReferenceMonth) -> Result<HashMap<Uuid, InvoiceRecord>>;

    /// Write `record` if the stored version still equals `expected_version`
    ///
    /// `None` means the record must not exist yet. Fails with
    /// [`StorageError::VersionConflict`](crate::core::error::StorageError::VersionConflict)
    /// otherwise.
    async fn save(&self, record: InvoiceRecord, expected_version: Option<u64>) -> Result<InvoiceRecord>;

    /// Load (or lazily create) the record, apply `action`, and write it back
    /// as a single atomic step
    async fn apply(
        &self,
        user_id: &Uuid,
        month: ReferenceMonth,
        action: InvoiceAction,
        now: DateTime<Utc>,
    ) -> Result<InvoiceRecord>;
}
