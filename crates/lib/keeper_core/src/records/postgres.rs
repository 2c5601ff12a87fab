//! `records` table queries.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{RecordError, RecordStore};
use crate::models::auth::UserId;
use crate::models::records::{DataType, Record, RecordInput};

type RecordRow = (i64, i32, String, String);

#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_id(id: u64) -> Result<i64, RecordError> {
    i64::try_from(id).map_err(|_| RecordError::NotFound)
}

fn to_record((id, kind, description, value): RecordRow) -> Result<Record, RecordError> {
    let kind = DataType::try_from(kind).map_err(RecordError::Validation)?;
    let id = u64::try_from(id).map_err(|_| RecordError::NotFound)?;
    Ok(Record {
        id,
        kind,
        description,
        value,
    })
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list(
        &self,
        owner: UserId,
        kind: Option<DataType>,
    ) -> Result<Vec<Record>, RecordError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT id, kind, description, value FROM records \
             WHERE user_id = $1 AND ($2::int IS NULL OR kind = $2) \
             ORDER BY id ASC",
        )
        .bind(db_id(owner)?)
        .bind(kind.map(DataType::code))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(to_record).collect()
    }

    async fn create(&self, owner: UserId, input: RecordInput) -> Result<Record, RecordError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "INSERT INTO records (user_id, kind, description, value) VALUES ($1, $2, $3, $4) \
             RETURNING id, kind, description, value",
        )
        .bind(db_id(owner)?)
        .bind(input.kind.code())
        .bind(&input.description)
        .bind(&input.value)
        .fetch_one(&self.pool)
        .await?;
        to_record(row)
    }

    async fn find(&self, owner: UserId, id: u64) -> Result<Record, RecordError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT id, kind, description, value FROM records WHERE id = $1 AND user_id = $2",
        )
        .bind(db_id(id)?)
        .bind(db_id(owner)?)
        .fetch_optional(&self.pool)
        .await?;
        to_record(row.ok_or(RecordError::NotFound)?)
    }

    async fn update(
        &self,
        owner: UserId,
        id: u64,
        input: RecordInput,
    ) -> Result<Record, RecordError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "UPDATE records SET kind = $3, description = $4, value = $5, updated_at = now() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING id, kind, description, value",
        )
        .bind(db_id(id)?)
        .bind(db_id(owner)?)
        .bind(input.kind.code())
        .bind(&input.description)
        .bind(&input.value)
        .fetch_optional(&self.pool)
        .await?;
        to_record(row.ok_or(RecordError::NotFound)?)
    }

    async fn delete(&self, owner: UserId, id: u64) -> Result<(), RecordError> {
        let result = sqlx::query("DELETE FROM records WHERE id = $1 AND user_id = $2")
            .bind(db_id(id)?)
            .bind(db_id(owner)?)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RecordError::NotFound);
        }
        Ok(())
    }
}
