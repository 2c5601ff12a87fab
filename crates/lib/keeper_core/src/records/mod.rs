//! Per-user secret records.
//!
//! Values are stored exactly as the client sends them.

mod memory;
mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::UserId;
use crate::models::records::{DataType, Record, RecordInput};

/// Record store errors.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Reject inputs the stores should never see.
pub fn validate_input(input: &RecordInput) -> Result<(), RecordError> {
    if input.value.is_empty() {
        return Err(RecordError::Validation("value is required".into()));
    }
    Ok(())
}

/// Storage for records. Every operation is scoped to the owning user: a
/// record belonging to someone else behaves as if it did not exist.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records of `owner`, optionally only of one kind, ordered by id.
    async fn list(&self, owner: UserId, kind: Option<DataType>)
    -> Result<Vec<Record>, RecordError>;

    async fn create(&self, owner: UserId, input: RecordInput) -> Result<Record, RecordError>;

    async fn find(&self, owner: UserId, id: u64) -> Result<Record, RecordError>;

    async fn update(&self, owner: UserId, id: u64, input: RecordInput)
    -> Result<Record, RecordError>;

    async fn delete(&self, owner: UserId, id: u64) -> Result<(), RecordError>;
}
