use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DirectoryError, UserDirectory};
use crate::models::auth::{Identity, UserId, UserWithPassword};

#[derive(Debug, Default)]
struct Users {
    next_id: UserId,
    by_id: HashMap<UserId, UserWithPassword>,
    ids_by_login: HashMap<String, UserId>,
}

/// In-process user directory.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: RwLock<Users>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_login(&self, login: &str) -> Result<UserWithPassword, DirectoryError> {
        let users = self.users.read().await;
        users
            .ids_by_login
            .get(login)
            .and_then(|id| users.by_id.get(id))
            .cloned()
            .ok_or(DirectoryError::NotFound)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Identity, DirectoryError> {
        self.users
            .read()
            .await
            .by_id
            .get(&id)
            .map(|user| user.identity.clone())
            .ok_or(DirectoryError::NotFound)
    }

    async fn create(&self, login: &str, password_hash: &str) -> Result<Identity, DirectoryError> {
        let mut users = self.users.write().await;
        if users.ids_by_login.contains_key(login) {
            return Err(DirectoryError::LoginTaken);
        }
        users.next_id += 1;
        let identity = Identity {
            id: users.next_id,
            login: login.to_string(),
        };
        users.ids_by_login.insert(login.to_string(), identity.id);
        users.by_id.insert(
            identity.id,
            UserWithPassword {
                identity: identity.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(identity)
    }
}
