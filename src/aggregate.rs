//! Concurrent multi-collection counting.
//!
//! One task per collection, all bound by a single absolute deadline. Outcomes
//! are gathered in completion order and split into successes and failures.
//! The result always holds exactly one entry per requested collection: a
//! timed-out, failed or even panicked count becomes a failure entry rather
//! than disappearing or sinking the whole run.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::store::{DocumentStore, StoreError};

/// One successful count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CollectionCount {
    pub collection: String,
    pub count: u64,
}

/// One failed count and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CollectionFailure {
    pub collection: String,
    pub error: String,
}

/// Merged outcome of one aggregation run, each list in arrival order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub results: Vec<CollectionCount>,
    pub errors: Vec<CollectionFailure>,
}

impl Aggregation {
    /// At least one collection failed.
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

enum Outcome {
    Counted(u64),
    Failed(StoreError),
}

/// Counts a fixed set of collections in parallel under a shared deadline.
#[derive(Clone, Debug)]
pub struct Aggregator {
    collections: Arc<[String]>,
    deadline: Duration,
}

impl Aggregator {
    /// Duplicate names are dropped, keeping the first occurrence, so each
    /// collection is counted once.
    pub fn new<I, C>(collections: I, deadline: Duration) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let mut seen = HashSet::new();
        let collections: Vec<String> = collections
            .into_iter()
            .map(Into::into)
            .filter(|c| seen.insert(c.clone()))
            .collect();
        Self { collections: collections.into(), deadline }
    }

    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Issues one count per collection and waits for all of them.
    ///
    /// Never fails as a whole and returns no later than the deadline plus
    /// scheduling slack, even if every call hangs.
    pub async fn run(&self, store: Arc<dyn DocumentStore>) -> Aggregation {
        let expires = Instant::now() + self.deadline;
        let budget = self.deadline;

        let mut tasks = JoinSet::new();
        for collection in self.collections.iter().cloned() {
            let store = Arc::clone(&store);
            tasks.spawn(async move {
                let outcome = match tokio::time::timeout_at(expires, store.count(&collection)).await {
                    Ok(Ok(count)) => Outcome::Counted(count),
                    Ok(Err(e)) => Outcome::Failed(e),
                    Err(_) => Outcome::Failed(StoreError::Timeout(budget)),
                };
                (collection, outcome)
            });
        }

        let mut pending: HashSet<&str> = self.collections.iter().map(String::as_str).collect();
        let mut merged = Aggregation::default();

        while let Some(joined) = tasks.join_next().await {
            let (collection, outcome) = match joined {
                Ok(v) => v,
                Err(e) => {
                    // The collection is recovered from `pending` below.
                    error!("count task did not complete: {e}");
                    continue;
                }
            };
            pending.remove(collection.as_str());

            match outcome {
                Outcome::Counted(count) => {
                    debug!(%collection, count, "collection counted");
                    merged.results.push(CollectionCount { collection, count });
                }
                Outcome::Failed(e) => {
                    debug!(%collection, "collection count failed: {e}");
                    merged.errors.push(CollectionFailure {
                        error: format!("error counting {collection}: {e}"),
                        collection,
                    });
                }
            }
        }

        // Only tasks that panicked or were aborted leave names behind.
        for collection in self.collections.iter().filter(|c| pending.contains(c.as_str())) {
            merged.errors.push(CollectionFailure {
                collection: collection.clone(),
                error: format!("error counting {collection}: count task did not complete"),
            });
        }

        merged
    }
}
