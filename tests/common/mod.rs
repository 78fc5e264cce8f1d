//! Shared fixtures for the HTTP-level tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use userstore::aggregate::Aggregator;
use userstore::api::{self, AppState};
use userstore::model::{User, UserFields, UserId};
use userstore::store::{DocumentStore, MemoryStore, StoreError};
use userstore::{Response, Router};

pub const COLLECTIONS: [&str; 3] = ["users", "products", "orders"];

/// Wraps [`MemoryStore`] and fails chosen operations on demand.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing_counts: HashSet<String>,
    hanging_counts: HashSet<String>,
    users_down: bool,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self { inner, ..Self::default() }
    }

    pub fn fail_count(mut self, collection: &str) -> Self {
        self.failing_counts.insert(collection.to_owned());
        self
    }

    pub fn hang_count(mut self, collection: &str) -> Self {
        self.hanging_counts.insert(collection.to_owned());
        self
    }

    /// Every user operation fails.
    pub fn users_down(mut self) -> Self {
        self.users_down = true;
        self
    }

    fn check_users(&self) -> Result<(), StoreError> {
        if self.users_down {
            Err(StoreError::Unavailable("users collection offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_users()?;
        self.inner.ping().await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.check_users()?;
        self.inner.list_users().await
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.check_users()?;
        self.inner.find_user(id).await
    }

    async fn insert_user(&self, fields: UserFields) -> Result<User, StoreError> {
        self.check_users()?;
        self.inner.insert_user(fields).await
    }

    async fn update_user(&self, user: &User) -> Result<bool, StoreError> {
        self.check_users()?;
        self.inner.update_user(user).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<bool, StoreError> {
        self.check_users()?;
        self.inner.delete_user(id).await
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        if self.failing_counts.contains(collection) {
            return Err(StoreError::Unavailable(format!("{collection} shard offline")));
        }
        if self.hanging_counts.contains(collection) {
            std::future::pending::<()>().await;
        }
        self.inner.count(collection).await
    }
}

pub fn app_with(store: impl DocumentStore + 'static) -> Router<AppState> {
    app_with_deadline(store, Duration::from_secs(5))
}

pub fn app_with_deadline(store: impl DocumentStore + 'static, deadline: Duration) -> Router<AppState> {
    let aggregator = Aggregator::new(COLLECTIONS, deadline);
    api::router(AppState::new(Arc::new(store), aggregator, Duration::from_secs(5)))
}

pub fn app() -> Router<AppState> {
    app_with(MemoryStore::new())
}

pub async fn call(app: &Router<AppState>, method: http::Method, uri: &str, body: &str) -> Response {
    let req = http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Bytes::from(body.to_owned()))
        .expect("valid request");
    app.handle(req).await
}

pub fn json(res: &Response) -> Value {
    serde_json::from_slice(res.body()).expect("json body")
}
