//! `users` table queries.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{DirectoryError, UserDirectory};
use crate::models::auth::{Identity, UserId, UserWithPassword};

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_identity(id: i64, login: String) -> Result<Identity, DirectoryError> {
    let id = UserId::try_from(id).map_err(|_| DirectoryError::NotFound)?;
    Ok(Identity { id, login })
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_login(&self, login: &str) -> Result<UserWithPassword, DirectoryError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, login, password_hash FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        let (id, login, password_hash) = row.ok_or(DirectoryError::NotFound)?;
        Ok(UserWithPassword {
            identity: to_identity(id, login)?,
            password_hash,
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Identity, DirectoryError> {
        let id = i64::try_from(id).map_err(|_| DirectoryError::NotFound)?;
        let row = sqlx::query_as::<_, (i64, String)>("SELECT id, login FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let (id, login) = row.ok_or(DirectoryError::NotFound)?;
        to_identity(id, login)
    }

    async fn create(&self, login: &str, password_hash: &str) -> Result<Identity, DirectoryError> {
        let result = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (login, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(login)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => to_identity(id, login.to_string()),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(DirectoryError::LoginTaken)
            }
            Err(e) => Err(e.into()),
        }
    }
}
