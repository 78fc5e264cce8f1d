//! In-process adapter.
//!
//! Users live in one map keyed by id. Aggregation counts come from a separate
//! tally map, mirroring the production layout where users and the counted
//! collections sit in different databases.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError};
use crate::model::{User, UserFields, UserId};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    tallies: RwLock<HashMap<String, u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the document count reported for `collection`.
    pub fn with_collection(mut self, collection: impl Into<String>, documents: u64) -> Self {
        self.tallies.get_mut().insert(collection.into(), documents);
        self
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn insert_user(&self, fields: UserFields) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let mut id = UserId::generate();
        while users.contains_key(&id) {
            id = UserId::generate();
        }
        let user = User::new(id, fields);
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<bool, StoreError> {
        match self.users.write().await.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: &UserId) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(id).is_some())
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        Ok(self.tallies.read().await.get(collection).copied().unwrap_or(0))
    }
}
