//! Document store port and its adapters.
//!
//! Handlers and the aggregator only see [`DocumentStore`]. [`MongoStore`] is
//! the production adapter over a pooled MongoDB client; [`MemoryStore`] keeps
//! everything in process for local runs and tests.
//!
//! Every implementation must tolerate concurrent calls from many tasks without
//! external locking, and must be cancel-safe: a call dropped at a deadline
//! leaves the store consistent.

mod memory;
mod mongo;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::model::{User, UserFields, UserId};

pub use memory::MemoryStore;
pub use mongo::{MongoStore, PoolSettings};

/// Collection holding user documents.
pub const USERS_COLLECTION: &str = "users";

/// Errors surfaced by store adapters. One value per failed call.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The caller's deadline elapsed before the store answered.
    #[error("deadline of {0:?} elapsed")]
    Timeout(Duration),

    /// The MongoDB driver reported a failure.
    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The backend could not serve the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Round-trip to the backend.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Every stored user.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Fetch a user by identifier.
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Store a new user under a freshly assigned identifier.
    async fn insert_user(&self, fields: UserFields) -> Result<User, StoreError>;

    /// Overwrite every settable field of an existing user.
    ///
    /// Returns `false` when no user has `user.id`.
    async fn update_user(&self, user: &User) -> Result<bool, StoreError>;

    /// Returns `false` when no user has `id`.
    async fn delete_user(&self, id: &UserId) -> Result<bool, StoreError>;

    /// Number of documents in `collection`. A missing collection counts 0.
    async fn count(&self, collection: &str) -> Result<u64, StoreError>;
}

/// Awaits `op` for at most `deadline`, mapping expiry to [`StoreError::Timeout`].
pub async fn within<T, F>(deadline: Duration, op: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(deadline, op)
        .await
        .map_err(|_| StoreError::Timeout(deadline))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn within_reports_elapsed_deadline() {
        let res: Result<(), _> = within(Duration::from_secs(5), std::future::pending()).await;
        assert!(matches!(res, Err(StoreError::Timeout(d)) if d == Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn within_passes_results_through() {
        let res = within(Duration::from_secs(5), async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(res.unwrap(), 7);
    }
}
