//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API request and
//! response shapes in `keeper_api::models`.

use serde::{Deserialize, Serialize};

/// Numeric user identifier. Ids start at 1; zero is never a valid user.
pub type UserId = u64;

/// A registered user as seen by everything outside the credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub login: String,
}

/// User with password hash (for internal auth flows only).
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub identity: Identity,
    pub password_hash: String,
}

