//! In-memory implementation of InvoiceStore for testing and development

use crate::core::error::{Result, StorageError};
use crate::core::invoice::{InvoiceAction, InvoiceRecord};
use crate::core::period::ReferenceMonth;
use crate::core::service::InvoiceStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

type RecordKey = (Uuid, ReferenceMonth);

/// In-memory invoice store
///
/// Every write runs under the map's write lock, so transitions on the same
/// record are serialized and readers always see whole records.
#[derive(Clone)]
pub struct InMemoryInvoiceStore {
    records: Arc<RwLock<HashMap<RecordKey, InvoiceRecord>>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> Result<usize> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryInvoiceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn get(&self, user_id: &Uuid, month: ReferenceMonth) -> Result<Option<InvoiceRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        Ok(records.get(&(*user_id, month)).cloned())
    }

    async fn list_month(&self, month: ReferenceMonth) -> Result<HashMap<Uuid, InvoiceRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        Ok(records
            .iter()
            .filter(|((_, m), _)| *m == month)
            .map(|((user_id, _), record)| (*user_id, record.clone()))
            .collect())
    }

    async fn save(&self, record: InvoiceRecord, expected_version: Option<u64>) -> Result<InvoiceRecord> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        let key = (record.user_id, record.month);
        let found = records.get(&key).map(|r| r.version);
        if found != expected_version {
            tracing::warn!(
                user_id = %record.user_id,
                month = %record.month,
                ?expected_version,
                ?found,
                "rejected stale invoice write"
            );
            return Err(StorageError::VersionConflict {
                user_id: record.user_id,
                month: record.month,
                expected: expected_version,
                found,
            }
            .into());
        }

        records.insert(key, record.clone());

        Ok(record)
    }

    async fn apply(
        &self,
        user_id: &Uuid,
        month: ReferenceMonth,
        action: InvoiceAction,
        now: DateTime<Utc>,
    ) -> Result<InvoiceRecord> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        let key = (*user_id, month);
        let mut record = records
            .get(&key)
            .cloned()
            .unwrap_or_else(|| InvoiceRecord::new(*user_id, month, now));
        let from = record.status;
        let action_name = action.name();

        record.apply(action, now)?;
        records.insert(key, record.clone());

        tracing::debug!(
            user_id = %user_id,
            %month,
            action = action_name,
            %from,
            to = %record.status,
            version = record.version,
            "invoice transition committed"
        );

        Ok(record)
    }
}
