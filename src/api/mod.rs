//! HTTP endpoints and the state they share.

pub mod demo;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use crate::aggregate::Aggregator;
use crate::health;
use crate::router::Router;
use crate::store::DocumentStore;

/// Everything a handler may touch. Built once at startup.
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub aggregator: Aggregator,
    /// Deadline applied to each single-user store call.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, aggregator: Aggregator, request_timeout: Duration) -> Self {
        Self { store, aggregator, request_timeout }
    }
}

/// The full route table.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new(state)
        .get("/users",           users::list_users)
        .get("/user/{id}",       users::get_user)
        .post("/user",           users::create_user)
        .put("/user/{id}",       users::update_user)
        .delete("/user/{id}",    users::delete_user)
        .get("/demo/concurrent", demo::concurrent_counts)
        .get("/health",          health::health)
        .get("/healthz",         health::liveness)
        .get("/readyz",          health::readiness)
}
