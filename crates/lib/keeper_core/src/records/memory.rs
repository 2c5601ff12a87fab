use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecordError, RecordStore};
use crate::models::auth::UserId;
use crate::models::records::{DataType, Record, RecordInput};

#[derive(Debug, Default)]
struct Rows {
    next_id: u64,
    // Ordered by id so listings come back in insertion order.
    by_id: BTreeMap<u64, (UserId, Record)>,
}

/// In-process record store.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    rows: RwLock<Rows>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list(
        &self,
        owner: UserId,
        kind: Option<DataType>,
    ) -> Result<Vec<Record>, RecordError> {
        let rows = self.rows.read().await;
        Ok(rows
            .by_id
            .values()
            .filter(|(user, record)| *user == owner && kind.is_none_or(|k| record.kind == k))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn create(&self, owner: UserId, input: RecordInput) -> Result<Record, RecordError> {
        let mut rows = self.rows.write().await;
        rows.next_id += 1;
        let record = Record {
            id: rows.next_id,
            kind: input.kind,
            description: input.description,
            value: input.value,
        };
        rows.by_id.insert(record.id, (owner, record.clone()));
        Ok(record)
    }

    async fn find(&self, owner: UserId, id: u64) -> Result<Record, RecordError> {
        let rows = self.rows.read().await;
        match rows.by_id.get(&id) {
            Some((user, record)) if *user == owner => Ok(record.clone()),
            _ => Err(RecordError::NotFound),
        }
    }

    async fn update(
        &self,
        owner: UserId,
        id: u64,
        input: RecordInput,
    ) -> Result<Record, RecordError> {
        let mut rows = self.rows.write().await;
        match rows.by_id.get_mut(&id) {
            Some((user, record)) if *user == owner => {
                record.kind = input.kind;
                record.description = input.description;
                record.value = input.value;
                Ok(record.clone())
            }
            _ => Err(RecordError::NotFound),
        }
    }

    async fn delete(&self, owner: UserId, id: u64) -> Result<(), RecordError> {
        let mut rows = self.rows.write().await;
        match rows.by_id.get(&id) {
            Some((user, _)) if *user == owner => {
                rows.by_id.remove(&id);
                Ok(())
            }
            _ => Err(RecordError::NotFound),
        }
    }
}
