//! User directory: lookup and creation of users by login or id.
//!
//! The auth flows only talk to [`UserDirectory`]; [`PgUserDirectory`] backs
//! it with the `users` table and [`MemoryUserDirectory`] keeps everything in
//! process for tests and `--in-memory` servers.

mod memory;
mod postgres;

pub use memory::MemoryUserDirectory;
pub use postgres::PgUserDirectory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::{Identity, UserId, UserWithPassword};

/// Directory errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("user not found")]
    NotFound,

    #[error("login already exists")]
    LoginTaken,

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user and their password hash by login.
    async fn find_by_login(&self, login: &str) -> Result<UserWithPassword, DirectoryError>;

    /// Fetch a user by id. A missing user is `NotFound`, never a zero id.
    async fn find_by_id(&self, id: UserId) -> Result<Identity, DirectoryError>;

    /// Create a user with an already-hashed password.
    async fn create(&self, login: &str, password_hash: &str) -> Result<Identity, DirectoryError>;
}
